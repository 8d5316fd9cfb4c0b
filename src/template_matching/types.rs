/// Template matching data types
use serde::{Deserialize, Serialize};

/// Correlation measure used to score template placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Zero-mean normalized cross-correlation, robust to uniform brightness shifts
    #[default]
    CoefficientNormed,
    /// Normalized cross-correlation without mean removal
    CrossCorrelationNormed,
}

/// Best placement of a template inside a searched image
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// X coordinate of the template's top-left corner in the searched image
    pub x: u32,
    /// Y coordinate of the template's top-left corner in the searched image
    pub y: u32,
    /// Correlation score at this placement
    pub correlation: f32,
}
