use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "anota=info";

/// Sends `tracing` output to `log_file`; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default filter.
pub fn init(log_file: &Path) -> color_eyre::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| eyre!("failed to install logger: {error}"))?;

    Ok(())
}
