use thiserror::Error;

/// A specialized `Result` type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Environment failures raised while grabbing pixels.
///
/// These are fatal to the current detection call. "Nothing visible yet" is never
/// reported through this type.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No display available for capture")]
    NoDisplay,

    #[error("Capture backend failed: {description}")]
    Backend { description: String },

    #[error(
        "Capture rectangle [{x},{y},{width},{height}] lies outside the {display_width}x{display_height} display"
    )]
    RectOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        display_width: u32,
        display_height: u32,
    },

    #[error("Search region is empty after clipping to the {display_width}x{display_height} display")]
    EmptyRegion {
        display_width: u32,
        display_height: u32,
    },

    #[error("Failed to load frame image: {source}")]
    ImageLoad {
        #[from]
        source: image::ImageError,
    },
}

impl CaptureError {
    /// Wrap any backend-specific error message
    pub fn backend(description: impl Into<String>) -> Self {
        CaptureError::Backend {
            description: description.into(),
        }
    }
}
