//! Error types for the note store and the thumbnail loader.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Thumbnail decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Thumbnail reference the loader cannot open
    #[error("Unsupported image reference: {0}")]
    InvalidReference(String),
}
