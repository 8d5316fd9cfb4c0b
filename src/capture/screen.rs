//! Live display capture through xcap

use super::error::{CaptureError, CaptureResult};
use super::types::{CaptureRect, FrameSource};
use image::{DynamicImage, RgbImage};
use xcap::Monitor;

/// Captures from the primary monitor
///
/// xcap grabs the whole monitor per call; the requested rectangle is cropped
/// out afterwards, so one `capture` is still one screen grab.
pub struct ScreenCapture {
    monitor: Monitor,
}

impl ScreenCapture {
    /// Open the primary monitor, or the first enumerated one if none is flagged
    pub fn primary() -> CaptureResult<Self> {
        let mut monitors = Monitor::all()
            .map_err(|e| CaptureError::backend(format!("Failed to enumerate monitors: {e}")))?;
        let index = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        if monitors.is_empty() {
            return Err(CaptureError::NoDisplay);
        }
        let monitor = monitors.swap_remove(index);
        log::info!(
            "Capturing from monitor '{}' ({}x{})",
            monitor.name(),
            monitor.width(),
            monitor.height()
        );
        Ok(Self { monitor })
    }
}

impl FrameSource for ScreenCapture {
    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        Ok((self.monitor.width(), self.monitor.height()))
    }

    fn capture(&self, rect: CaptureRect) -> CaptureResult<RgbImage> {
        let screenshot = self
            .monitor
            .capture_image()
            .map_err(|e| CaptureError::backend(format!("Screen capture failed: {e}")))?;
        let screenshot = DynamicImage::ImageRgba8(screenshot).to_rgb8();

        let (display_width, display_height) = screenshot.dimensions();
        if display_width == 0 || display_height == 0 {
            return Err(CaptureError::NoDisplay);
        }
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

        Ok(image::imageops::crop_imm(&screenshot, rect.x, rect.y, rect.width, rect.height).to_image())
    }
}
