//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, adapter protocol, tests).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the spawn side)
//! - **Spawn anchor**: (4, 0), orientation 0°
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_RUN` | 3 | Shortest run of one color that clears |
//! | `RUN_POINTS` | 10 | Points per run (immediate clears) or per staged cell (committed clears) |
//! | `CHAIN_BONUS` | 50 | Points per chain reaction pass |
//! | `POINTS_PER_LEVEL` | 1000 | Score needed per level |
//!
//! # Examples
//!
//! ```
//! use colour_balls_types::{Action, BallColor, Orientation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let red = BallColor::new(1).unwrap();
//! assert_eq!(red.get(), 1);
//! assert!(BallColor::new(0).is_none());
//!
//! let o = Orientation::Deg0.rotate_cw();
//! assert_eq!(o, Orientation::Deg90);
//! assert_eq!(o.offset(2), (0, 2));
//!
//! assert_eq!(Action::from_str("hard_drop"), Some(Action::HardDrop));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Number of balls in every piece.
pub const PIECE_LENGTH: usize = 3;

/// Number of distinct ball colors (ids 1..=COLOR_COUNT).
pub const COLOR_COUNT: u8 = 6;

/// Shortest same-color run that qualifies as a match.
pub const MIN_RUN: usize = 3;

/// Points per matched run (or per staged cell on a committed clear).
pub const RUN_POINTS: u32 = 10;

/// Points per chain reaction pass.
pub const CHAIN_BONUS: u32 = 50;

/// Score needed to advance one level.
pub const POINTS_PER_LEVEL: u32 = 1000;

/// A ball color id in `1..=COLOR_COUNT`. Zero is reserved for "empty" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallColor(u8);

impl BallColor {
    /// Returns None for ids outside `1..=COLOR_COUNT`.
    pub const fn new(id: u8) -> Option<Self> {
        if id >= 1 && id <= COLOR_COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// The full palette, in id order.
pub const PALETTE: [BallColor; COLOR_COUNT as usize] = [
    BallColor(1),
    BallColor(2),
    BallColor(3),
    BallColor(4),
    BallColor(5),
    BallColor(6),
];

/// Cell on the board (None = empty, Some = filled with a ball)
pub type Cell = Option<BallColor>;

/// Wire encoding of a cell: 0 for empty, the color id otherwise.
pub fn cell_to_u8(cell: Cell) -> u8 {
    cell.map(BallColor::get).unwrap_or(0)
}

/// Direction the balls of a piece extend in, measured clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Balls extend in +x; the anchor is the leftmost ball.
    #[default]
    Deg0,
    /// Balls extend in +y (downwards); the anchor is the topmost ball.
    Deg90,
    /// Balls extend in -x; the anchor is the rightmost ball.
    Deg180,
    /// Balls extend in -y (upwards); the anchor is the bottommost ball.
    Deg270,
}

impl Orientation {
    /// Rotate clockwise by 90 degrees
    pub fn rotate_cw(&self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg0,
        }
    }

    /// Offset `(dx, dy)` of the ball at `index` relative to the anchor.
    #[inline]
    pub fn offset(&self, index: usize) -> (i8, i8) {
        let i = index as i8;
        match self {
            Orientation::Deg0 => (i, 0),
            Orientation::Deg90 => (0, i),
            Orientation::Deg180 => (-i, 0),
            Orientation::Deg270 => (0, -i),
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }
}

/// Gameplay actions accepted by a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    MoveDown,
    HardDrop,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Rotate,
        Action::MoveDown,
        Action::HardDrop,
    ];

    /// Parse action from its wire name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "move_left" => Some(Action::MoveLeft),
            "move_right" => Some(Action::MoveRight),
            "rotate" => Some(Action::Rotate),
            "move_down" => Some(Action::MoveDown),
            "hard_drop" => Some(Action::HardDrop),
            _ => None,
        }
    }

    /// Convert to wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Rotate => "rotate",
            Action::MoveDown => "move_down",
            Action::HardDrop => "hard_drop",
        }
    }

    /// Drops are the actions that can lock a piece.
    pub fn can_lock(&self) -> bool {
        matches!(self, Action::MoveDown | Action::HardDrop)
    }
}

/// Summary of the most recent lock / clear resolution (consumed by observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LockEvent {
    /// A piece was written into the board.
    pub locked: bool,
    /// Matches are staged and waiting for a commit.
    pub staged: bool,
    /// Cells removed by this resolution.
    pub cells_cleared: u32,
    /// Runs counted on the first match pass.
    pub runs: u32,
    /// Chain passes executed after the first clear.
    pub chains: u32,
    /// Points added to the score.
    pub score_delta: u32,
}
