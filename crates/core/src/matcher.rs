//! Match finder - detects same-color runs in four directions
//!
//! Every cell is a scan origin for each direction. A run of `MIN_RUN` or more
//! balls of one color counts once per origin that starts it, and all of its
//! cells join a single coalesced set.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH, MIN_RUN};

/// A board position as `(row, col)`.
pub type CellPos = (u8, u8);

/// Scan directions as (dx, dy): right, down, down-right, down-left.
const DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Result of a match pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Every cell that belongs to at least one qualifying run, sorted row-major.
    pub cells: BTreeSet<CellPos>,
    /// Number of qualifying runs found across all origins and directions.
    pub runs: u32,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Length of the same-color run starting at (x, y) heading in (dx, dy).
/// Zero for an empty origin.
fn run_length(board: &Board, x: i8, y: i8, dx: i8, dy: i8) -> usize {
    let Some(Some(color)) = board.get(x, y) else {
        return 0;
    };

    let mut len = 1usize;
    let (mut cx, mut cy) = (x + dx, y + dy);
    while board.get(cx, cy) == Some(Some(color)) {
        len += 1;
        cx += dx;
        cy += dy;
    }
    len
}

/// Scan the whole board for runs of `MIN_RUN` or more.
pub fn find_matches(board: &Board) -> MatchResult {
    let mut result = MatchResult::default();

    for &(dx, dy) in &DIRECTIONS {
        for y in 0..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                let len = run_length(board, x, y, dx, dy);
                if len < MIN_RUN {
                    continue;
                }

                result.runs += 1;
                for step in 0..len as i8 {
                    let col = x + dx * step;
                    let row = y + dy * step;
                    result.cells.insert((row as u8, col as u8));
                }
            }
        }
    }

    result
}
