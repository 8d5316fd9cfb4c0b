//! Color to piece classification

use super::color::{Color, ColorTable, Piece};
use serde::{Deserialize, Serialize};

/// How sampled colors become labels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ClassifierPolicy {
    /// Always answer with the nearest reference color
    #[default]
    Fast,
    /// Answer only for non-background colors whose nearest reference beats the
    /// runner-up by `min_margin`
    Robust { min_margin: f64 },
}

impl ClassifierPolicy {
    /// Label a sampled color
    ///
    /// The robust policy reports background (every channel below
    /// `dark_threshold`) as unknown instead of matching it to the darkest piece.
    pub fn apply(&self, color: Color, table: &ColorTable, dark_threshold: u8) -> Option<Piece> {
        match *self {
            ClassifierPolicy::Fast => Some(classify(color, table)),
            ClassifierPolicy::Robust { .. } if is_background(color, dark_threshold) => {
                log::debug!("Background color ({},{},{}) in slot", color.r, color.g, color.b);
                None
            }
            ClassifierPolicy::Robust { min_margin } => classify_robust(color, table, min_margin),
        }
    }
}

/// Nearest reference color by squared distance; first entry wins ties
pub fn classify(color: Color, table: &ColorTable) -> Piece {
    let (first, rest) = table.entries().split_at(1);
    let (mut best_piece, first_color) = first[0];
    let mut best_distance = color.distance_squared(&first_color);

    for (piece, reference) in rest {
        let distance = color.distance_squared(reference);
        if distance < best_distance {
            best_distance = distance;
            best_piece = *piece;
        }
    }
    best_piece
}

/// Nearest reference color, or `None` when the runner-up is within `min_margin`
pub fn classify_robust(color: Color, table: &ColorTable, min_margin: f64) -> Option<Piece> {
    let mut best: Option<(Piece, f64)> = None;
    let mut second_distance = f64::INFINITY;

    for (piece, reference) in table.entries() {
        let distance = color.distance(reference);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {
                second_distance = second_distance.min(distance);
            }
            Some((_, best_distance)) => {
                second_distance = best_distance;
                best = Some((*piece, distance));
            }
            None => best = Some((*piece, distance)),
        }
    }

    let (piece, best_distance) = best?;
    if second_distance - best_distance < min_margin {
        log::debug!(
            "Ambiguous color ({},{},{}): best {} at {:.1}, runner-up at {:.1}",
            color.r,
            color.g,
            color.b,
            piece,
            best_distance,
            second_distance
        );
        return None;
    }
    Some(piece)
}

/// True when every channel is below `dark_threshold` (empty preview cell)
pub fn is_background(color: Color, dark_threshold: u8) -> bool {
    color.channels().iter().all(|&c| c < dark_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece_detection::color::STANDARD_COLORS;

    #[test]
    fn test_reference_colors_classify_to_their_piece() {
        let table = ColorTable::standard();
        for (piece, color) in STANDARD_COLORS {
            assert_eq!(classify(color, table), piece);
            assert_eq!(classify_robust(color, table, 10.0), Some(piece));
        }
    }

    #[test]
    fn test_near_color_classifies() {
        let table = ColorTable::standard();
        assert_eq!(classify(Color::new(52, 175, 128), table), Piece::I);
        assert_eq!(classify_robust(Color::new(205, 62, 190), table, 10.0), Some(Piece::T));
    }

    #[test]
    fn test_equidistant_color() {
        // Exactly as far from O (179,153,49) as from L (180,99,50)
        let color = Color::new(180, 126, 49);
        let table = ColorTable::standard();

        assert_eq!(classify_robust(color, table, 1.0), None);
        let first = classify(color, table);
        assert_eq!(first, Piece::O, "First entry in table order wins the tie");
        for _ in 0..10 {
            assert_eq!(classify(color, table), first);
        }
    }

    #[test]
    fn test_zero_margin_never_rejects() {
        let color = Color::new(180, 126, 49);
        assert_eq!(classify_robust(color, ColorTable::standard(), 0.0), Some(Piece::O));
    }

    #[test]
    fn test_policy_dispatch() {
        let color = Color::new(180, 126, 49);
        let table = ColorTable::standard();
        assert_eq!(ClassifierPolicy::Fast.apply(color, table, 40), Some(Piece::O));
        assert_eq!(ClassifierPolicy::Robust { min_margin: 5.0 }.apply(color, table, 40), None);
    }

    #[test]
    fn test_robust_policy_rejects_dark_cells() {
        // Nearest to J by a wide margin, but still empty background
        let dark = Color::new(10, 10, 38);
        let table = ColorTable::standard();
        let robust = ClassifierPolicy::Robust { min_margin: 12.0 };

        assert_eq!(classify_robust(dark, table, 12.0), Some(Piece::J));
        assert_eq!(robust.apply(dark, table, 40), None);
        assert_eq!(ClassifierPolicy::Fast.apply(dark, table, 40), Some(Piece::J));
        assert_eq!(robust.apply(Color::new(78, 61, 164), table, 40), Some(Piece::J));
    }

    #[test]
    fn test_background_detection() {
        assert!(is_background(Color::new(10, 12, 30), 40));
        assert!(!is_background(Color::new(10, 12, 40), 40));
        assert!(!is_background(Color::new(49, 178, 130), 40));
    }
}
