//! Quarto pieces.
//!
//! Every piece has four binary attributes. The 16 pieces are generated once in
//! a canonical order (shape outermost, filling innermost) and each piece's
//! position in that order is its id. The id doubles as a 4-bit trait mask,
//! which makes the "share an attribute" test a couple of bit operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PIECE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Height {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filling {
    Empty,
    Full,
}

/// A single Quarto piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub shape: Shape,
    pub color: Color,
    pub height: Height,
    pub filling: Filling,
}

impl Piece {
    /// Build the piece with the given canonical id (only the low 4 bits are used).
    pub const fn from_id(id: u8) -> Self {
        Piece {
            shape: if id & 0b1000 == 0 { Shape::Round } else { Shape::Square },
            color: if id & 0b0100 == 0 { Color::Dark } else { Color::Light },
            height: if id & 0b0010 == 0 { Height::Low } else { Height::High },
            filling: if id & 0b0001 == 0 { Filling::Empty } else { Filling::Full },
        }
    }

    /// Canonical id in `0..16`; also the attribute bit mask.
    #[inline]
    pub const fn id(self) -> u8 {
        (matches!(self.shape, Shape::Square) as u8) << 3
            | (matches!(self.color, Color::Light) as u8) << 2
            | (matches!(self.height, Height::High) as u8) << 1
            | matches!(self.filling, Filling::Full) as u8
    }

    /// The full piece set in canonical generation order.
    pub fn all() -> [Piece; PIECE_COUNT] {
        std::array::from_fn(|i| Piece::from_id(i as u8))
    }
}

/// Check whether four pieces agree on at least one attribute.
///
/// An attribute is shared when its bit is set in every id (`and`) or clear
/// in every id (`or`).
#[inline]
pub fn share_attribute(pieces: [Piece; 4]) -> bool {
    let and = pieces.iter().fold(0b1111, |acc, p| acc & p.id());
    let or = pieces.iter().fold(0, |acc, p| acc | p.id());
    and != 0 || or != 0b1111
}

impl fmt::Display for Piece {
    /// Six-character notation: brackets give the shape, doubled for high
    /// pieces, then `E`/`F` for the filling and `L`/`D` for the color.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.shape {
            Shape::Round => ('(', ')'),
            Shape::Square => ('[', ']'),
        };
        let filling = match self.filling {
            Filling::Empty => 'E',
            Filling::Full => 'F',
        };
        let color = match self.color {
            Color::Light => 'L',
            Color::Dark => 'D',
        };
        match self.height {
            Height::Low => write!(f, " {open}{filling}{color}{close} "),
            Height::High => write!(f, "{open}{open}{filling}{color}{close}{close}"),
        }
    }
}
