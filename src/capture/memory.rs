//! In-memory frame source for saved screenshots and synthetic test frames

use super::error::{CaptureError, CaptureResult};
use super::types::{CaptureRect, FrameSource};
use image::RgbImage;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed frame standing in for the display
///
/// Counts capture calls so callers can check how many captures a detection cost.
#[derive(Debug)]
pub struct StaticFrame {
    image: RgbImage,
    captures: AtomicUsize,
}

impl StaticFrame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captures: AtomicUsize::new(0),
        }
    }

    /// Load a screenshot from disk (alpha is dropped)
    pub fn from_file<P: AsRef<Path>>(path: P) -> CaptureResult<Self> {
        let image = image::open(path.as_ref())?.to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::NoDisplay);
        }
        log::debug!(
            "Loaded frame {:?} ({}x{})",
            path.as_ref(),
            image.width(),
            image.height()
        );
        Ok(Self::new(image))
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Number of capture calls served so far
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::Relaxed)
    }

    pub fn reset_capture_count(&self) {
        self.captures.store(0, Ordering::Relaxed);
    }
}

impl FrameSource for StaticFrame {
    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        Ok(self.image.dimensions())
    }

    fn capture(&self, rect: CaptureRect) -> CaptureResult<RgbImage> {
        let (display_width, display_height) = self.image.dimensions();
        if rect.is_empty() || !rect.fits_within(display_width, display_height) {
            return Err(CaptureError::RectOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                display_width,
                display_height,
            });
        }

        self.captures.fetch_add(1, Ordering::Relaxed);
        Ok(image::imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image())
    }
}
