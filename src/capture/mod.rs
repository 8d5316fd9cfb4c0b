//! Frame capture layer
//!
//! Every pixel the detector looks at comes through a [`FrameSource`]. A capture
//! call has a fixed cost regardless of area, so callers should request one
//! rectangle covering everything they need rather than many small ones.

pub mod error;
pub mod memory;
#[cfg(feature = "screen")]
pub mod screen;
pub mod types;

pub use error::{CaptureError, CaptureResult};
pub use memory::StaticFrame;
#[cfg(feature = "screen")]
pub use screen::ScreenCapture;
pub use types::{CaptureRect, FrameSource};
