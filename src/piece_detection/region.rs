//! Search region for anchor localization

use crate::capture::{CaptureError, CaptureRect, CaptureResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SearchRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a full-screen region
    pub fn full_screen(screen_width: u32, screen_height: u32) -> Self {
        Self::new(0, 0, screen_width, screen_height)
    }

    /// Parse region coordinates from "x,y,width,height" (brackets optional)
    pub fn parse(region_str: &str) -> Option<SearchRegion> {
        let trimmed = region_str.trim().trim_start_matches('[').trim_end_matches(']');
        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() == 4
            && let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
                parts[0].trim().parse::<u32>(),
                parts[1].trim().parse::<u32>(),
                parts[2].trim().parse::<u32>(),
                parts[3].trim().parse::<u32>(),
            )
        {
            let region = SearchRegion::new(x, y, width, height);
            return region.is_valid().then_some(region);
        }
        None
    }

    /// Clip region to screen boundaries
    ///
    /// Fails when nothing of the region remains on screen.
    pub fn clip_to_screen(&self, screen_width: u32, screen_height: u32) -> CaptureResult<CaptureRect> {
        let empty = CaptureError::EmptyRegion {
            display_width: screen_width,
            display_height: screen_height,
        };
        if !self.is_valid() || self.x >= screen_width || self.y >= screen_height {
            return Err(empty);
        }

        let width = self.width.min(screen_width - self.x);
        let height = self.height.min(screen_height - self.y);
        if width < self.width || height < self.height {
            log::warn!(
                "Search region [{},{},{},{}] clipped to {}x{} display",
                self.x,
                self.y,
                self.width,
                self.height,
                screen_width,
                screen_height
            );
        }
        Ok(CaptureRect::new(self.x, self.y, width, height))
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for SearchRegion {
    fn default() -> Self {
        Self::full_screen(1920, 1080)
    }
}
