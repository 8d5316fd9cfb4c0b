pub mod capture;
pub mod piece_detection;
pub mod template_matching;

pub use capture::{CaptureError, FrameSource, StaticFrame};
pub use piece_detection::{DetectionConfig, DetectionPipeline, DetectionResult, Piece};
