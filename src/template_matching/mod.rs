/// Correlation engine used to find UI landmarks in captured frames
///
/// This module provides:
/// - Zero-mean normalized cross-correlation (score range -1.0..=1.0)
/// - Plain normalized cross-correlation via imageproc (score range 0.0..=1.0)
/// - Downscaling helpers for coarse, cheaper matching
pub mod matcher;
pub mod types;

pub use matcher::TemplateMatcher;
pub use types::{Match, MatchMethod};
