//! Anchor template loading

use image::{DynamicImage, GrayImage, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to load template {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Template {path:?} has no pixels")]
    Empty { path: PathBuf },
}

/// Decoded reference image of the anchor label
///
/// Immutable once built; share it by reference between detection calls.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    gray: GrayImage,
}

impl Template {
    /// Load and decode a template from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TemplateError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TemplateError::Empty {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template")
            .to_string();
        log::debug!("Loaded template '{}' ({}x{})", name, image.width(), image.height());
        Ok(Self::from_image(name, image))
    }

    pub fn from_image(name: impl Into<String>, image: DynamicImage) -> Self {
        Self::from_rgb(name, image.to_rgb8())
    }

    pub fn from_rgb(name: impl Into<String>, rgb: RgbImage) -> Self {
        Self {
            name: name.into(),
            gray: DynamicImage::ImageRgb8(rgb).to_luma8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    /// Grayscale copy used for correlation
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }
}
