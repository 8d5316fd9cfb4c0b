//! Anchor localization: find the "next" label inside the search region

use super::region::SearchRegion;
use super::template::Template;
use crate::capture::{CaptureResult, FrameSource};
use crate::template_matching::matcher::downscale;
use crate::template_matching::{MatchMethod, TemplateMatcher};
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;

/// Located anchor in full-resolution screen coordinates
///
/// `width`/`height` are always the template's original size, even when matching
/// ran on a downscaled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnchorMatch {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub score: f32,
}

/// Finds the anchor template inside a captured search region
pub struct AnchorLocator<'s, S: FrameSource> {
    source: &'s S,
    matcher: TemplateMatcher,
}

impl<'s, S: FrameSource> AnchorLocator<'s, S> {
    pub fn new(source: &'s S, method: MatchMethod) -> Self {
        Self {
            source,
            matcher: TemplateMatcher::new(method),
        }
    }

    /// Locate `template` in `region`
    ///
    /// Issues exactly one capture. `resolution_scale` below 1.0 shrinks both the
    /// frame and the template before correlating; the match is mapped back to
    /// full resolution. Returns `Ok(None)` when the best score is below
    /// `threshold` (UI not shown yet), and `Err` only when capture fails.
    pub fn locate(
        &self,
        region: &SearchRegion,
        template: &Template,
        threshold: f32,
        resolution_scale: f32,
    ) -> CaptureResult<Option<AnchorMatch>> {
        let start = Instant::now();
        let (display_width, display_height) = self.source.display_size()?;
        let rect = region.clip_to_screen(display_width, display_height)?;
        let frame = self.source.capture(rect)?;
        let capture_ms = start.elapsed().as_millis();

        let scale = if resolution_scale > 0.0 && resolution_scale <= 1.0 {
            resolution_scale
        } else {
            log::warn!("Ignoring resolution scale {resolution_scale}, matching at full resolution");
            1.0
        };

        let frame_gray = DynamicImage::ImageRgb8(frame).to_luma8();
        let (frame_gray, template_gray): (Cow<GrayImage>, Cow<GrayImage>) = if scale < 1.0 {
            match (downscale(&frame_gray, scale), downscale(template.gray(), scale)) {
                (Some(f), Some(t)) => (Cow::Owned(f), Cow::Owned(t)),
                _ => {
                    log::debug!("Template '{}' vanishes at scale {scale}", template.name);
                    return Ok(None);
                }
            }
        } else {
            (Cow::Owned(frame_gray), Cow::Borrowed(template.gray()))
        };

        let Some(best) = self.matcher.best_match(&frame_gray, &template_gray) else {
            return Ok(None);
        };

        log::debug!(
            "Anchor '{}' best score {:.3} (threshold {:.2}, scale {:.2}): capture {}ms, total {}ms",
            template.name,
            best.correlation,
            threshold,
            scale,
            capture_ms,
            start.elapsed().as_millis()
        );

        if best.correlation < threshold {
            return Ok(None);
        }

        Ok(Some(AnchorMatch {
            x: rect.x as i32 + (best.x as f32 / scale).round() as i32,
            y: rect.y as i32 + (best.y as f32 / scale).round() as i32,
            width: template.width(),
            height: template.height(),
            score: best.correlation,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureError, StaticFrame};
    use image::{Rgb, RgbImage, imageops};

    /// 24x16 label built from 8x8 blocks so it survives 2x downscaling
    fn label() -> RgbImage {
        let levels = [[20u8, 230, 120], [180, 60, 250]];
        RgbImage::from_fn(24, 16, |x, y| {
            let v = levels[(y / 8) as usize][(x / 8) as usize];
            Rgb([v, v, v])
        })
    }

    fn frame_with_label(at: (i64, i64)) -> StaticFrame {
        let mut image = RgbImage::from_pixel(320, 240, Rgb([90, 90, 90]));
        imageops::replace(&mut image, &label(), at.0, at.1);
        StaticFrame::new(image)
    }

    #[test]
    fn test_locate_reports_region_relative_offset() {
        let frame = frame_with_label((70, 100));
        let locator = AnchorLocator::new(&frame, MatchMethod::CoefficientNormed);
        let template = Template::from_rgb("next", label());
        let region = SearchRegion::new(20, 20, 200, 200);

        let anchor = locator.locate(&region, &template, 0.7, 1.0).unwrap().unwrap();
        assert_eq!((anchor.x, anchor.y), (20 + 50, 20 + 80));
        assert_eq!((anchor.width, anchor.height), (24, 16));
        assert!(anchor.score > 0.99);
        assert_eq!(frame.capture_count(), 1);
    }

    #[test]
    fn test_locate_downscaled_maps_back_to_full_resolution() {
        let frame = frame_with_label((70, 100));
        let locator = AnchorLocator::new(&frame, MatchMethod::CoefficientNormed);
        let template = Template::from_rgb("next", label());
        let region = SearchRegion::new(20, 20, 200, 200);

        let anchor = locator.locate(&region, &template, 0.7, 0.5).unwrap().unwrap();
        assert!((anchor.x - 70).abs() <= 2, "x = {}", anchor.x);
        assert!((anchor.y - 100).abs() <= 2, "y = {}", anchor.y);
        assert_eq!((anchor.width, anchor.height), (24, 16), "Original template size");
    }

    #[test]
    fn test_locate_below_threshold_is_none() {
        let frame = StaticFrame::new(RgbImage::from_pixel(320, 240, Rgb([90, 90, 90])));
        let locator = AnchorLocator::new(&frame, MatchMethod::CoefficientNormed);
        let template = Template::from_rgb("next", label());

        let anchor = locator
            .locate(&SearchRegion::new(0, 0, 320, 240), &template, 0.7, 1.0)
            .unwrap();
        assert!(anchor.is_none());
    }

    #[test]
    fn test_template_larger_than_region_is_none() {
        let frame = frame_with_label((0, 0));
        let locator = AnchorLocator::new(&frame, MatchMethod::CoefficientNormed);
        let template = Template::from_rgb("next", label());

        let anchor = locator
            .locate(&SearchRegion::new(0, 0, 10, 10), &template, 0.7, 1.0)
            .unwrap();
        assert!(anchor.is_none());
    }

    #[test]
    fn test_region_off_display_is_error() {
        let frame = frame_with_label((0, 0));
        let locator = AnchorLocator::new(&frame, MatchMethod::CoefficientNormed);
        let template = Template::from_rgb("next", label());

        let err = locator
            .locate(&SearchRegion::new(400, 0, 50, 50), &template, 0.7, 1.0)
            .unwrap_err();
        assert!(matches!(err, CaptureError::EmptyRegion { .. }));
    }
}
