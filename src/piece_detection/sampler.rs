//! Frame sampling with as few capture calls as possible
//!
//! A capture call costs roughly the same whatever its area, so the default path
//! grabs one rectangle enclosing every requested point and reads all samples
//! from that buffer.

use super::classifier::is_background;
use super::color::Color;
use super::projector::{Point, SampleWindow};
use crate::capture::{CaptureRect, CaptureResult, FrameSource};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How sample points are turned into capture calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureStrategy {
    /// One capture of the bounding box of all points
    #[default]
    BoundingBox,
    /// One 1x1 capture per point
    PerPoint,
    /// One capture covering every slot's sample window, scanning a window when
    /// its first point is background
    RegionScan,
}

/// Captured rectangle plus its position on the display
struct Patch {
    rect: CaptureRect,
    image: RgbImage,
}

impl Patch {
    fn color_at(&self, point: Point) -> Option<Color> {
        let x = u32::try_from(point.x).ok()?.checked_sub(self.rect.x)?;
        let y = u32::try_from(point.y).ok()?.checked_sub(self.rect.y)?;
        self.image.get_pixel_checked(x, y).map(|p| Color::from(*p))
    }
}

pub struct FrameSampler<'s, S: FrameSource> {
    source: &'s S,
}

impl<'s, S: FrameSource> FrameSampler<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source }
    }

    /// Sample `points` with the given strategy
    ///
    /// `RegionScan` has no windows to scan here and behaves like `BoundingBox`.
    pub fn sample(
        &self,
        points: &[Point],
        strategy: CaptureStrategy,
    ) -> CaptureResult<HashMap<Point, Color>> {
        match strategy {
            CaptureStrategy::PerPoint => self.sample_per_point(points),
            CaptureStrategy::BoundingBox | CaptureStrategy::RegionScan => {
                self.sample_bounding_box(points)
            }
        }
    }

    /// Sample every point from a single capture of their bounding box
    ///
    /// Points off the display get no entry. No capture is issued when no point
    /// is on the display.
    pub fn sample_bounding_box(&self, points: &[Point]) -> CaptureResult<HashMap<Point, Color>> {
        let (display_width, display_height) = self.source.display_size()?;
        let visible: Vec<CaptureRect> = points
            .iter()
            .filter_map(|p| clip_to_display(*p, 1, 1, display_width, display_height))
            .collect();

        let Some(rect) = union(&visible) else {
            log::debug!("No sample point on the {display_width}x{display_height} display");
            return Ok(HashMap::new());
        };

        let patch = self.capture_patch(rect)?;
        log::debug!(
            "Sampled {} points from one {}x{} capture at ({},{})",
            points.len(),
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );

        Ok(points
            .iter()
            .filter_map(|p| patch.color_at(*p).map(|c| (*p, c)))
            .collect())
    }

    /// Sample every point with its own 1x1 capture
    pub fn sample_per_point(&self, points: &[Point]) -> CaptureResult<HashMap<Point, Color>> {
        let (display_width, display_height) = self.source.display_size()?;
        let mut colors = HashMap::with_capacity(points.len());

        for point in points {
            if colors.contains_key(point) {
                continue;
            }
            if let Some(rect) = clip_to_display(*point, 1, 1, display_width, display_height) {
                let pixel = self.source.capture(rect)?;
                if let Some(p) = pixel.get_pixel_checked(0, 0) {
                    colors.insert(*point, Color::from(*p));
                }
            }
        }
        Ok(colors)
    }

    /// Find the first non-background color in each cell with one capture
    ///
    /// A cell is a projected point with an optional window whose top-left is the
    /// point. The point itself is tried first; when it is background (or off the
    /// display) the window is walked row by row at the window's step. Cells whose
    /// every scanned pixel is background yield `None`.
    pub fn scan_windows(
        &self,
        cells: &[(Point, Option<SampleWindow>)],
        dark_threshold: u8,
    ) -> CaptureResult<Vec<Option<Color>>> {
        let (display_width, display_height) = self.source.display_size()?;
        let windows: Vec<CaptureRect> = cells
            .iter()
            .filter_map(|(point, window)| {
                let (width, height) = window.map_or((1, 1), |w| (w.width, w.height));
                clip_to_display(*point, width, height, display_width, display_height)
            })
            .collect();

        let Some(rect) = union(&windows) else {
            return Ok(vec![None; cells.len()]);
        };
        let patch = self.capture_patch(rect)?;

        let visible = |color: &Color| !is_background(*color, dark_threshold);
        Ok(cells
            .iter()
            .map(|(point, window)| {
                if let Some(color) = patch.color_at(*point).filter(visible) {
                    return Some(color);
                }
                let window = (*window)?;
                let step = window.step.max(1) as usize;
                (0..window.height as i32)
                    .step_by(step)
                    .flat_map(|dy| {
                        (0..window.width as i32)
                            .step_by(step)
                            .map(move |dx| Point::new(point.x + dx, point.y + dy))
                    })
                    .filter_map(|p| patch.color_at(p))
                    .find(visible)
            })
            .collect())
    }

    fn capture_patch(&self, rect: CaptureRect) -> CaptureResult<Patch> {
        let image = self.source.capture(rect)?;
        Ok(Patch { rect, image })
    }
}

/// Part of the `width` x `height` rectangle at `origin` that lies on the display
fn clip_to_display(
    origin: Point,
    width: u32,
    height: u32,
    display_width: u32,
    display_height: u32,
) -> Option<CaptureRect> {
    let left = (origin.x as i64).max(0);
    let top = (origin.y as i64).max(0);
    let right = (origin.x as i64 + width as i64).min(display_width as i64);
    let bottom = (origin.y as i64 + height as i64).min(display_height as i64);
    if right <= left || bottom <= top {
        return None;
    }
    Some(CaptureRect::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Smallest rectangle enclosing all `rects`
fn union(rects: &[CaptureRect]) -> Option<CaptureRect> {
    let left = rects.iter().map(|r| r.x).min()?;
    let top = rects.iter().map(|r| r.y).min()?;
    let right = rects.iter().map(|r| r.x + r.width).max()?;
    let bottom = rects.iter().map(|r| r.y + r.height).max()?;
    Some(CaptureRect::new(left, top, right - left, bottom - top))
}
