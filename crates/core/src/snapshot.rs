use crate::board::U8Grid;
use crate::matcher::CellPos;
use crate::piece::{Piece, PieceColors};
use crate::types::{LockEvent, Orientation, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub colors: PieceColors,
    pub x: i8,
    pub y: i8,
    pub orientation: Orientation,
}

impl From<Piece> for ActiveSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            colors: value.colors,
            x: value.x,
            y: value.y,
            orientation: value.orientation,
        }
    }
}

/// Everything a session exposes outward. Plain data; the adapter encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: U8Grid,
    pub active: Option<ActiveSnapshot>,
    pub next_colors: Option<PieceColors>,
    pub score: u32,
    pub level: u32,
    pub game_over: bool,
    pub started: bool,
    pub piece_id: u32,
    pub seed: u32,
    /// Staged cells as `(row, col)`, row-major.
    pub matched: Vec<CellPos>,
    pub last_event: Option<LockEvent>,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.started && !self.game_over
    }

    /// Matches are staged and the caller is expected to commit them.
    pub fn awaiting_commit(&self) -> bool {
        !self.matched.is_empty()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            next_colors: None,
            score: 0,
            level: 1,
            game_over: false,
            started: false,
            piece_id: 0,
            seed: 0,
            matched: Vec::new(),
            last_event: None,
        }
    }
}
