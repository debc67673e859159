//! Gravity - lets balls fall into the gaps left by a clear

use crate::board::Board;
use crate::types::BOARD_WIDTH;

/// Compact every column independently. Returns true if any ball moved.
pub fn apply_gravity(board: &mut Board) -> bool {
    let mut moved = false;
    for x in 0..BOARD_WIDTH as i8 {
        moved |= board.compact_column(x);
    }
    moved
}

/// True if no column has an empty cell beneath a filled one.
pub fn is_settled(board: &Board) -> bool {
    let mut settled = board.clone();
    !apply_gravity(&mut settled)
}
