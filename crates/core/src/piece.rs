//! Pieces module - multi-ball pieces and their geometry
//!
//! A piece is `PIECE_LENGTH` colored balls laid out in a straight line from an
//! anchor cell. The orientation picks the direction the line extends in.

use crate::types::{BallColor, Orientation, BOARD_WIDTH, PIECE_LENGTH};

/// Colors of one piece, in ball order (index 0 sits on the anchor).
pub type PieceColors = [BallColor; PIECE_LENGTH];

/// Spawn anchor for new pieces (x, y): centered horizontally on the top row.
pub const SPAWN_POSITION: (i8, i8) = (
    (BOARD_WIDTH as i8) / 2 - (PIECE_LENGTH as i8) / 2,
    0,
);

/// Absolute cell of ball `index` for a piece anchored at (x, y).
#[inline]
pub fn ball_position(x: i8, y: i8, orientation: Orientation, index: usize) -> (i8, i8) {
    let (dx, dy) = orientation.offset(index);
    (x + dx, y + dy)
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub colors: PieceColors,
    pub x: i8,
    pub y: i8,
    pub orientation: Orientation,
}

impl Piece {
    /// Create a new piece at spawn position
    pub fn new(colors: PieceColors) -> Self {
        Self {
            colors,
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
            orientation: Orientation::Deg0,
        }
    }

    /// Absolute `(x, y, color)` of every ball.
    pub fn cells(&self) -> [(i8, i8, BallColor); PIECE_LENGTH] {
        std::array::from_fn(|i| {
            let (x, y) = ball_position(self.x, self.y, self.orientation, i);
            (x, y, self.colors[i])
        })
    }

    /// Same piece with its anchor moved by (dx, dy).
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Same piece turned to `orientation` around an unchanged anchor.
    pub fn with_orientation(&self, orientation: Orientation) -> Self {
        Self {
            orientation,
            ..*self
        }
    }
}
