// Core capture types and traits
use super::error::CaptureResult;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Pixel rectangle on the display, always non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies completely inside a `display_width` x `display_height` display
    pub fn fits_within(&self, display_width: u32, display_height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= display_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= display_height)
    }
}

// Capability to grab RGB pixels from a display (live screen or stored frame)
pub trait FrameSource {
    /// Width and height of the whole display in pixels
    fn display_size(&self) -> CaptureResult<(u32, u32)>;

    /// Capture one rectangle. Each call is one capture, whatever the size.
    fn capture(&self, rect: CaptureRect) -> CaptureResult<RgbImage>;
}

impl<S: FrameSource + ?Sized> FrameSource for &S {
    fn display_size(&self) -> CaptureResult<(u32, u32)> {
        (**self).display_size()
    }

    fn capture(&self, rect: CaptureRect) -> CaptureResult<RgbImage> {
        (**self).capture(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_within_display() {
        assert!(CaptureRect::new(0, 0, 1920, 1080).fits_within(1920, 1080));
        assert!(!CaptureRect::new(1, 0, 1920, 1080).fits_within(1920, 1080));
        assert!(!CaptureRect::new(u32::MAX, 0, 2, 1).fits_within(1920, 1080));
    }

    #[test]
    fn test_empty_rect() {
        assert!(CaptureRect::new(5, 5, 0, 3).is_empty());
        assert!(!CaptureRect::new(5, 5, 1, 1).is_empty());
    }
}
