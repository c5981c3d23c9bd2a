//! Asynchronous thumbnail loading.
//!
//! References are decoded on a worker thread into a small square pixel grid
//! that the list draws with half-block cells. The UI thread drains finished
//! decodes with [`ImageLoader::poll`].

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use image::GenericImageView;
use image::imageops::FilterType;

use crate::error::{Error, Result};

/// Thumbnail footprint in terminal cells. Each cell holds two pixels stacked
/// vertically, so the grid is square in pixels.
pub const THUMBNAIL_COLS: u16 = 6;
pub const THUMBNAIL_ROWS: u16 = 3;
const THUMBNAIL_PX: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixels {
    width: u32,
    height: u32,
    rgb: Vec<[u8; 3]>,
}

impl Pixels {
    pub(crate) fn from_rgb(width: u32, height: u32, rgb: Vec<[u8; 3]>) -> Self {
        debug_assert_eq!(rgb.len(), (width * height) as usize);
        Self { width, height, rgb }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.rgb.get((y * self.width + x) as usize).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Ready(Pixels),
    Failed,
}

pub struct ImageLoader {
    requests: Sender<String>,
    results: Receiver<(String, Result<Pixels>)>,
    cache: HashMap<String, ImageState>,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (requests, inbox) = mpsc::channel::<String>();
        let (outbox, results) = mpsc::channel();

        thread::spawn(move || {
            for reference in inbox {
                let decoded = decode_thumbnail(&reference);
                if outbox.send((reference, decoded)).is_err() {
                    break;
                }
            }
        });

        Self {
            requests,
            results,
            cache: HashMap::new(),
        }
    }

    /// Starts loading `reference` unless it is already known.
    pub fn request(&mut self, reference: &str) -> &ImageState {
        if !self.cache.contains_key(reference) {
            let state = match self.requests.send(reference.to_string()) {
                Ok(()) => ImageState::Loading,
                Err(_) => {
                    tracing::warn!("Image worker is gone, skipping {reference}");
                    ImageState::Failed
                }
            };
            self.cache.insert(reference.to_string(), state);
        }
        &self.cache[reference]
    }

    #[cfg(test)]
    pub fn get(&self, reference: &str) -> Option<&ImageState> {
        self.cache.get(reference)
    }

    /// Forgets every cached thumbnail that is not in `references`.
    pub fn retain<'a>(&mut self, references: impl IntoIterator<Item = &'a str>) {
        let keep: HashSet<&str> = references.into_iter().collect();
        self.cache.retain(|reference, _| keep.contains(reference.as_str()));
    }

    /// Collects finished decodes for references still in the cache. Returns
    /// whether any arrived.
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        while let Ok((reference, decoded)) = self.results.try_recv() {
            let state = match decoded {
                Ok(pixels) => ImageState::Ready(pixels),
                Err(error) => {
                    tracing::debug!("Thumbnail {reference} failed to load: {error}");
                    ImageState::Failed
                }
            };
            if let Some(entry) = self.cache.get_mut(&reference) {
                *entry = state;
                updated = true;
            }
        }
        updated
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes the file behind `reference` and crops it to a centered square.
/// Plain paths and `file://` URIs are supported.
pub fn decode_thumbnail(reference: &str) -> Result<Pixels> {
    let path = reference.strip_prefix("file://").unwrap_or(reference);
    if path.is_empty() || path.contains("://") {
        return Err(Error::InvalidReference(reference.to_string()));
    }

    let source = image::open(path)?;
    let (width, height) = source.dimensions();
    let side = width.min(height);
    if side == 0 {
        return Err(Error::InvalidReference(reference.to_string()));
    }

    let square = source
        .crop_imm((width - side) / 2, (height - side) / 2, side, side)
        .resize_exact(THUMBNAIL_PX, THUMBNAIL_PX, FilterType::Triangle)
        .to_rgb8();

    Ok(Pixels::from_rgb(
        square.width(),
        square.height(),
        square.pixels().map(|pixel| pixel.0).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use image::{Rgb, RgbImage};

    use super::*;

    fn red_png(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(12, 8, Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn decodes_to_a_square_grid() {
        let dir = tempfile::tempdir().unwrap();
        let pixels = decode_thumbnail(&red_png(&dir)).unwrap();

        assert_eq!((pixels.width(), pixels.height()), (THUMBNAIL_PX, THUMBNAIL_PX));
        assert_eq!(pixels.get(0, 0), Some([255, 0, 0]));
        assert_eq!(pixels.get(THUMBNAIL_PX, 0), None);
    }

    #[test]
    fn accepts_file_uris() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("file://{}", red_png(&dir));

        assert!(decode_thumbnail(&uri).is_ok());
    }

    #[test]
    fn rejects_remote_and_missing_references() {
        assert!(matches!(
            decode_thumbnail("https://example.com/a.png"),
            Err(Error::InvalidReference(_))
        ));
        assert!(decode_thumbnail("/definitely/not/here.png").is_err());
    }

    fn wait_for(loader: &mut ImageLoader, reference: &str) -> ImageState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            loader.poll();
            match loader.get(reference) {
                Some(ImageState::Loading) | None if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Some(state) => return state.clone(),
                None => panic!("{reference} was never requested"),
            }
        }
    }

    #[test]
    fn loader_decodes_off_thread() {
        let dir = tempfile::tempdir().unwrap();
        let reference = red_png(&dir);
        let mut loader = ImageLoader::new();

        assert_eq!(loader.request(&reference), &ImageState::Loading);

        assert!(matches!(wait_for(&mut loader, &reference), ImageState::Ready(_)));
    }

    #[test]
    fn broken_references_end_up_failed() {
        let mut loader = ImageLoader::new();
        loader.request("/definitely/not/here.png");

        assert_eq!(
            wait_for(&mut loader, "/definitely/not/here.png"),
            ImageState::Failed
        );
    }

    #[test]
    fn retain_drops_unreferenced_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let kept = red_png(&dir);
        let mut loader = ImageLoader::new();
        loader.request(&kept);
        loader.request("/definitely/not/here.png");

        loader.retain([kept.as_str()]);

        assert!(loader.get(&kept).is_some());
        assert!(loader.get("/definitely/not/here.png").is_none());
        assert!(matches!(wait_for(&mut loader, &kept), ImageState::Ready(_)));
        assert!(loader.get("/definitely/not/here.png").is_none());
    }
}
