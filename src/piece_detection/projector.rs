//! Offset projection from the anchor to piece preview sample points

use super::anchor::AnchorMatch;
use serde::{Deserialize, Serialize};

/// Absolute screen position; may be negative or off-display after projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Displacement from a reference corner of the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelOffset {
    pub dx: i32,
    pub dy: i32,
}

impl PixelOffset {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Corner of the anchor an offset is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceCorner {
    /// The match position itself (used by the current piece, which sits up-left of the label)
    TopLeft,
    /// Directly below the label (used by queue slots)
    #[default]
    BottomLeft,
}

impl ReferenceCorner {
    /// Screen position of this corner for a given anchor
    pub fn origin(&self, anchor: &AnchorMatch) -> Point {
        match self {
            ReferenceCorner::TopLeft => Point::new(anchor.x, anchor.y),
            ReferenceCorner::BottomLeft => Point::new(anchor.x, anchor.y + anchor.height as i32),
        }
    }
}

/// Area to scan when the first sample point lands on background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub width: u32,
    pub height: u32,
    /// Distance between scanned pixels, in both directions
    pub step: u32,
}

impl SampleWindow {
    pub fn new(width: u32, height: u32, step: u32) -> Self {
        Self {
            width,
            height,
            step: step.max(1),
        }
    }
}

/// Where one piece preview is sampled, relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOffset {
    pub offset: PixelOffset,
    pub corner: ReferenceCorner,
    /// Top-left of the window is the projected point
    pub window: Option<SampleWindow>,
}

impl SlotOffset {
    /// Offset from the anchor's top-left corner
    pub fn from_top_left(dx: i32, dy: i32) -> Self {
        Self {
            offset: PixelOffset::new(dx, dy),
            corner: ReferenceCorner::TopLeft,
            window: None,
        }
    }

    /// Offset from the anchor's bottom-left corner
    pub fn from_bottom_left(dx: i32, dy: i32) -> Self {
        Self {
            offset: PixelOffset::new(dx, dy),
            corner: ReferenceCorner::BottomLeft,
            window: None,
        }
    }

    pub fn with_window(mut self, window: SampleWindow) -> Self {
        self.window = Some(window);
        self
    }
}

/// Project a single slot offset to an absolute screen point
pub fn project_point(anchor: &AnchorMatch, slot: &SlotOffset) -> Point {
    let origin = slot.corner.origin(anchor);
    Point::new(origin.x + slot.offset.dx, origin.y + slot.offset.dy)
}

/// Project every slot offset, preserving order
pub fn project(anchor: &AnchorMatch, slots: &[SlotOffset]) -> Vec<Point> {
    slots.iter().map(|slot| project_point(anchor, slot)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> AnchorMatch {
        AnchorMatch {
            x: 1500,
            y: 200,
            width: 80,
            height: 30,
            score: 0.93,
        }
    }

    #[test]
    fn test_queue_offsets_measure_from_bottom_edge() {
        let points = project(
            &anchor(),
            &[
                SlotOffset::from_bottom_left(104, 60),
                SlotOffset::from_bottom_left(104, 165),
            ],
        );
        assert_eq!(points, vec![Point::new(1604, 290), Point::new(1604, 395)]);
    }

    #[test]
    fn test_current_offset_measures_from_top_left() {
        let point = project_point(&anchor(), &SlotOffset::from_top_left(-225, -60));
        assert_eq!(point, Point::new(1275, 140));
    }

    #[test]
    fn test_projection_is_pure_and_invertible() {
        let slots = [
            SlotOffset::from_top_left(-225, -60),
            SlotOffset::from_bottom_left(104, 480),
            SlotOffset::from_bottom_left(-3000, -3000),
        ];
        let first = project(&anchor(), &slots);
        assert_eq!(first, project(&anchor(), &slots));

        for (point, slot) in first.iter().zip(&slots) {
            let origin = slot.corner.origin(&anchor());
            assert_eq!(PixelOffset::new(point.x - origin.x, point.y - origin.y), slot.offset);
        }
    }

    #[test]
    fn test_sample_window_step_is_at_least_one() {
        assert_eq!(SampleWindow::new(10, 10, 0).step, 1);
    }
}
