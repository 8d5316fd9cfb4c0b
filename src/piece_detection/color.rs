//! Piece identities and their reference colors

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// RGB sample, whatever channel order the capture backend used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance in RGB space
    pub fn distance_squared(&self, other: &Color) -> u32 {
        self.channels()
            .iter()
            .zip(other.channels())
            .map(|(&a, b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum()
    }

    pub fn distance(&self, other: &Color) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.channels())
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// The seven tetromino identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Piece {
    pub const ALL: [Piece; 7] = [
        Piece::I,
        Piece::O,
        Piece::T,
        Piece::S,
        Piece::Z,
        Piece::J,
        Piece::L,
    ];

    pub fn as_char(&self) -> char {
        match self {
            Piece::I => 'I',
            Piece::O => 'O',
            Piece::T => 'T',
            Piece::S => 'S',
            Piece::Z => 'Z',
            Piece::J => 'J',
            Piece::L => 'L',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Piece::ALL
            .into_iter()
            .find(|p| p.as_char() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Default preview palette of the supported skin
pub const STANDARD_COLORS: [(Piece, Color); 7] = [
    (Piece::I, Color::new(49, 178, 130)),
    (Piece::O, Color::new(179, 153, 49)),
    (Piece::T, Color::new(207, 60, 193)),
    (Piece::S, Color::new(131, 179, 50)),
    (Piece::Z, Color::new(179, 52, 59)),
    (Piece::J, Color::new(78, 61, 164)),
    (Piece::L, Color::new(180, 99, 50)),
];

static STANDARD_TABLE: LazyLock<ColorTable> = LazyLock::new(|| ColorTable::new(STANDARD_COLORS));

/// Reference color for every piece
///
/// Entry order is the classification tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTable {
    entries: [(Piece, Color); 7],
}

impl ColorTable {
    pub fn new(entries: [(Piece, Color); 7]) -> Self {
        Self { entries }
    }

    /// Process-wide table with the standard palette
    pub fn standard() -> &'static ColorTable {
        &STANDARD_TABLE
    }

    pub fn entries(&self) -> &[(Piece, Color)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_order() {
        let pieces: Vec<Piece> = ColorTable::standard().entries().iter().map(|(p, _)| *p).collect();
        assert_eq!(pieces, Piece::ALL.to_vec());
    }

    #[test]
    fn test_distance() {
        let a = Color::new(0, 0, 0);
        let b = Color::new(3, 4, 0);
        assert_eq!(a.distance_squared(&b), 25);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_piece_chars() {
        assert_eq!(Piece::from_char('s'), Some(Piece::S));
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::J.to_string(), "J");
    }
}
