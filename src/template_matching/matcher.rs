/// Template matching implementation
///
/// Computes a dense score surface over every placement of a template inside an
/// image and reports the global maximum.
use super::types::{Match, MatchMethod};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

/// Windows whose intensity variance falls below this are treated as flat
const FLAT_ENERGY_EPSILON: f64 = 1e-6;

/// Searches with fewer placements are scored exhaustively
const COARSE_MIN_PLACEMENTS: u64 = 250_000;
/// Smallest template side (after halving) the coarse pass still trusts
const COARSE_MIN_TEMPLATE_SIDE: u32 = 4;
/// Full-resolution search radius around the coarse peak, in pixels
const REFINE_RADIUS: u32 = 4;

/// Score surface: one f32 per template placement
pub type ScoreSurface = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Correlation-based template matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateMatcher {
    method: MatchMethod,
}

impl TemplateMatcher {
    pub fn new(method: MatchMethod) -> Self {
        Self { method }
    }

    /// Score every placement of `template` inside `image`
    ///
    /// Returns `None` when the template is empty or larger than the image.
    pub fn score_surface(&self, image: &GrayImage, template: &GrayImage) -> Option<ScoreSurface> {
        if template.width() == 0
            || template.height() == 0
            || template.width() > image.width()
            || template.height() > image.height()
        {
            log::debug!(
                "Template {}x{} cannot be placed in image {}x{}",
                template.width(),
                template.height(),
                image.width(),
                image.height()
            );
            return None;
        }

        let surface = match self.method {
            MatchMethod::CoefficientNormed => coefficient_normed(image, template),
            MatchMethod::CrossCorrelationNormed => {
                match_template(image, template, MatchTemplateMethod::CrossCorrelationNormalized)
            }
        };
        Some(surface)
    }

    /// Global maximum of the score surface
    ///
    /// Large searches with the zero-mean method run coarse-to-fine: a half
    /// resolution pass picks the candidate, then full resolution is scored only
    /// in a small neighborhood around it.
    pub fn best_match(&self, image: &GrayImage, template: &GrayImage) -> Option<Match> {
        if self.method == MatchMethod::CoefficientNormed
            && let Some(best) = self.coarse_to_fine(image, template)
        {
            return Some(best);
        }

        let surface = self.score_surface(image, template)?;
        let extremes = find_extremes(&surface);
        let (x, y) = extremes.max_value_location;

        log::debug!(
            "  Correlation peak {:.3} at ({},{}) over {}x{} placements",
            extremes.max_value,
            x,
            y,
            surface.width(),
            surface.height()
        );

        Some(Match {
            x,
            y,
            correlation: extremes.max_value,
        })
    }

    /// Half-resolution search refined at full resolution
    ///
    /// Returns `None` when the search is small enough to score exhaustively or
    /// the template would be too small after halving.
    fn coarse_to_fine(&self, image: &GrayImage, template: &GrayImage) -> Option<Match> {
        let (image_width, image_height) = image.dimensions();
        let (template_width, template_height) = template.dimensions();
        if template_width > image_width || template_height > image_height {
            return None;
        }
        let placements = (image_width - template_width + 1) as u64
            * (image_height - template_height + 1) as u64;
        if placements < COARSE_MIN_PLACEMENTS
            || template_width.min(template_height) < 2 * COARSE_MIN_TEMPLATE_SIDE
        {
            return None;
        }

        let coarse_image = downscale(image, 0.5)?;
        let coarse_template = downscale(template, 0.5)?;
        let coarse = find_extremes(&self.score_surface(&coarse_image, &coarse_template)?);
        let (cx, cy) = coarse.max_value_location;

        let max_x = image_width - template_width;
        let max_y = image_height - template_height;
        let left = (cx * 2).saturating_sub(REFINE_RADIUS).min(max_x);
        let top = (cy * 2).saturating_sub(REFINE_RADIUS).min(max_y);
        let right = (cx * 2 + REFINE_RADIUS).min(max_x);
        let bottom = (cy * 2 + REFINE_RADIUS).min(max_y);

        let neighborhood = imageops::crop_imm(
            image,
            left,
            top,
            right - left + template_width,
            bottom - top + template_height,
        )
        .to_image();
        let fine = find_extremes(&coefficient_normed(&neighborhood, template));
        let (fx, fy) = fine.max_value_location;

        log::debug!(
            "  Coarse peak {:.3} at ({},{}), refined {:.3} at ({},{})",
            coarse.max_value,
            cx * 2,
            cy * 2,
            fine.max_value,
            left + fx,
            top + fy
        );

        Some(Match {
            x: left + fx,
            y: top + fy,
            correlation: fine.max_value,
        })
    }
}

/// Shrink an image by `scale` (0.0 < scale <= 1.0), flooring each dimension
///
/// Returns `None` when the result would have a zero dimension.
pub fn downscale(image: &GrayImage, scale: f32) -> Option<GrayImage> {
    if scale >= 1.0 {
        return Some(image.clone());
    }
    let width = (image.width() as f32 * scale) as u32;
    let height = (image.height() as f32 * scale) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some(imageops::resize(image, width, height, FilterType::Triangle))
}

/// Zero-mean normalized cross-correlation
///
/// score = Σ(T'·I) / sqrt(Σ T'² · (Σ I² − (Σ I)²/n)), where T' is the template with
/// its mean removed. Window sums come from integral images so only the cross term
/// is computed per placement. Flat templates or flat windows score 0.
fn coefficient_normed(image: &GrayImage, template: &GrayImage) -> ScoreSurface {
    let (image_width, image_height) = image.dimensions();
    let (template_width, template_height) = template.dimensions();
    let out_width = image_width - template_width + 1;
    let out_height = image_height - template_height + 1;

    let n = (template_width * template_height) as f64;
    let template_mean = template.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let template_zero_mean: Vec<f64> = template
        .pixels()
        .map(|p| p[0] as f64 - template_mean)
        .collect();
    let template_energy: f64 = template_zero_mean.iter().map(|v| v * v).sum();

    if template_energy <= FLAT_ENERGY_EPSILON {
        log::debug!("Flat template, every placement scores 0");
        return ImageBuffer::new(out_width, out_height);
    }

    let sums: Image<Luma<u64>> = integral_image::<_, u64>(image);
    let squares: Image<Luma<u64>> = integral_squared_image::<_, u64>(image);
    let pixels = image.as_raw();
    let row_stride = image_width as usize;
    let tw = template_width as usize;

    let score_at = |x: u32, y: u32| -> f32 {
        let window_sum = window_total(&sums, x, y, template_width, template_height) as f64;
        let window_squares = window_total(&squares, x, y, template_width, template_height) as f64;
        let window_energy = window_squares - window_sum * window_sum / n;
        if window_energy <= FLAT_ENERGY_EPSILON {
            return 0.0;
        }

        let mut cross = 0.0;
        for ty in 0..template_height as usize {
            let image_row = (y as usize + ty) * row_stride + x as usize;
            let template_row = ty * tw;
            for tx in 0..tw {
                cross += template_zero_mean[template_row + tx] * pixels[image_row + tx] as f64;
            }
        }

        (cross / (template_energy * window_energy).sqrt()).clamp(-1.0, 1.0) as f32
    };
    let score_row = |y: u32| (0..out_width).map(move |x| score_at(x, y));

    #[cfg(feature = "parallel")]
    let scores: Vec<f32> = {
        use rayon::prelude::*;
        (0..out_height).into_par_iter().flat_map_iter(score_row).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let scores: Vec<f32> = (0..out_height).flat_map(score_row).collect();

    ImageBuffer::from_raw(out_width, out_height, scores)
        .unwrap_or_else(|| ImageBuffer::new(out_width, out_height))
}

/// Sum over the `width` x `height` window at (x, y), read from a padded integral image
fn window_total(integral: &Image<Luma<u64>>, x: u32, y: u32, width: u32, height: u32) -> u64 {
    let top_left = integral.get_pixel(x, y)[0];
    let top_right = integral.get_pixel(x + width, y)[0];
    let bottom_left = integral.get_pixel(x, y + height)[0];
    let bottom_right = integral.get_pixel(x + width, y + height)[0];
    bottom_right + top_left - top_right - bottom_left
}
