//! Configuration for piece detection

use super::classifier::ClassifierPolicy;
use super::projector::{SampleWindow, SlotOffset};
use super::region::SearchRegion;
use super::sampler::CaptureStrategy;
use crate::template_matching::MatchMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of upcoming pieces the preview shows
pub const DEFAULT_QUEUE_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Screen area searched for the anchor label
    pub search_region: SearchRegion,
    /// Image of the "next" label
    pub template_path: PathBuf,
    /// Minimum correlation for the anchor to count as found
    pub anchor_threshold: f32,
    /// Downscale factor applied before correlation (1.0 = full resolution)
    pub resolution_scale: f32,
    pub match_method: MatchMethod,
    /// Falling piece sample point
    pub current_offset: SlotOffset,
    /// Queue sample points, nearest piece first
    pub queue_offsets: Vec<SlotOffset>,
    pub strategy: CaptureStrategy,
    pub policy: ClassifierPolicy,
    /// Channels all below this count as empty background
    pub dark_threshold: u8,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            search_region: SearchRegion::full_screen(1920, 1080),
            template_path: "assets/next_template.png".into(),
            anchor_threshold: 0.7,
            resolution_scale: 0.5,
            match_method: MatchMethod::CoefficientNormed,
            current_offset: SlotOffset::from_top_left(-225, -60),
            queue_offsets: default_queue_offsets(),
            strategy: CaptureStrategy::BoundingBox,
            policy: ClassifierPolicy::Fast,
            dark_threshold: 40,
        }
    }
}

impl DetectionConfig {
    pub fn queue_length(&self) -> usize {
        self.queue_offsets.len()
    }
}

/// Queue slots 105px apart, measured from the label's bottom edge
pub fn default_queue_offsets() -> Vec<SlotOffset> {
    (0..DEFAULT_QUEUE_LENGTH as i32)
        .map(|i| SlotOffset::from_bottom_left(104, 60 + 105 * i))
        .collect()
}

/// Speed-oriented preset: half-resolution matching, best-guess labels
pub fn create_fast_config() -> DetectionConfig {
    DetectionConfig::default()
}

/// Precision-oriented preset: full-resolution matching, ambiguous colors become unknown
pub fn create_precise_config() -> DetectionConfig {
    DetectionConfig {
        anchor_threshold: 0.8,
        resolution_scale: 1.0,
        policy: ClassifierPolicy::Robust { min_margin: 12.0 },
        ..DetectionConfig::default()
    }
}

/// Preset for previews where the sample point can land between blocks
pub fn create_region_scan_config() -> DetectionConfig {
    let window = SampleWindow::new(40, 40, 4);
    let base = create_precise_config();
    DetectionConfig {
        current_offset: base.current_offset.with_window(window),
        queue_offsets: base
            .queue_offsets
            .iter()
            .map(|slot| slot.with_window(window))
            .collect(),
        strategy: CaptureStrategy::RegionScan,
        ..base
    }
}
