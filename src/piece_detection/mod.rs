//! Piece detection for the falling-block preview
//!
//! This module finds the "next" label on screen, projects the preview slots
//! from it, and turns the sampled colors into piece labels for the move engine.

pub mod anchor;
pub mod classifier;
pub mod color;
pub mod config;
pub mod detector;
pub mod projector;
pub mod region;
pub mod sampler;
pub mod template;


// Re-export main types and functions
pub use anchor::{AnchorLocator, AnchorMatch};
pub use classifier::{ClassifierPolicy, classify, classify_robust, is_background};
pub use color::{Color, ColorTable, Piece, STANDARD_COLORS};
pub use config::{
    DEFAULT_QUEUE_LENGTH, DetectionConfig, create_fast_config, create_precise_config,
    create_region_scan_config, default_queue_offsets,
};
pub use detector::{DetectionPipeline, DetectionResult};
pub use projector::{
    PixelOffset, Point, ReferenceCorner, SampleWindow, SlotOffset, project, project_point,
};
pub use region::SearchRegion;
pub use sampler::{CaptureStrategy, FrameSampler};
pub use template::{Template, TemplateError};
