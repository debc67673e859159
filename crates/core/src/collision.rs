//! Collision module - legality checks for hypothetical piece placements
//!
//! Every movement, rotation, and drop asks this module before committing a new
//! anchor or orientation. Nothing here mutates the board.

use crate::board::Board;
use crate::piece::{ball_position, Piece};
use crate::types::{BallColor, Orientation, PIECE_LENGTH};

/// True if any ball of a piece with `colors` anchored at (x, y) would sit out of
/// bounds or on an occupied cell. An empty color list never collides.
pub fn is_collision(
    board: &Board,
    colors: &[BallColor],
    x: i8,
    y: i8,
    orientation: Orientation,
) -> bool {
    (0..colors.len()).any(|i| {
        let (bx, by) = ball_position(x, y, orientation, i);
        !board.is_valid(bx, by)
    })
}

/// True if `piece` can sit where it is.
#[inline]
pub fn fits(board: &Board, piece: &Piece) -> bool {
    !is_collision(board, &piece.colors, piece.x, piece.y, piece.orientation)
}

/// Direction of the wall kick tried when turning into `target`.
///
/// Only the horizontal results kick: a 180° piece grows to the left of its anchor,
/// so it is pushed right, and a 0° piece grows to the right, so it is pushed left.
fn kick_direction(target: Orientation) -> Option<i8> {
    match target {
        Orientation::Deg180 => Some(1),
        Orientation::Deg0 => Some(-1),
        Orientation::Deg90 | Orientation::Deg270 => None,
    }
}

/// Turn `piece` 90° clockwise, kicking it sideways if needed.
///
/// Returns the placed piece, or None if the rotation is not possible.
pub fn resolve_rotation(board: &Board, piece: &Piece) -> Option<Piece> {
    let rotated = piece.with_orientation(piece.orientation.rotate_cw());
    if fits(board, &rotated) {
        return Some(rotated);
    }

    let direction = kick_direction(rotated.orientation)?;
    (1..PIECE_LENGTH as i8)
        .map(|offset| rotated.shifted(direction * offset, 0))
        .find(|kicked| fits(board, kicked))
}

/// Lowest anchor row the piece can reach by falling straight down.
pub fn landing_y(board: &Board, piece: &Piece) -> i8 {
    let mut y = piece.y;
    while !is_collision(board, &piece.colors, piece.x, y + 1, piece.orientation) {
        y += 1;
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

    fn c(id: u8) -> BallColor {
        BallColor::new(id).unwrap()
    }

    fn piece(x: i8, y: i8, orientation: Orientation) -> Piece {
        Piece {
            colors: [c(1), c(2), c(3)],
            x,
            y,
            orientation,
        }
    }

    #[test]
    fn test_empty_colors_never_collide() {
        let board = Board::new();
        assert!(!is_collision(&board, &[], -5, -5, Orientation::Deg0));
    }

    #[test]
    fn test_bounds() {
        let board = Board::new();
        let colors = [c(1), c(2), c(3)];
        assert!(!is_collision(&board, &colors, 7, 0, Orientation::Deg0));
        assert!(is_collision(&board, &colors, 8, 0, Orientation::Deg0));
        assert!(is_collision(&board, &colors, 1, 0, Orientation::Deg180));
        assert!(!is_collision(&board, &colors, 2, 0, Orientation::Deg180));
        assert!(is_collision(&board, &colors, 0, 18, Orientation::Deg90));
        assert!(is_collision(&board, &colors, 0, 1, Orientation::Deg270));
        assert!(!is_collision(&board, &colors, 0, 2, Orientation::Deg270));
    }

    #[test]
    fn test_occupied_cell_collides() {
        let mut board = Board::new();
        board.set(5, 10, Some(c(4)));
        let colors = [c(1), c(2), c(3)];
        assert!(is_collision(&board, &colors, 3, 10, Orientation::Deg0));
        assert!(!is_collision(&board, &colors, 3, 9, Orientation::Deg0));
    }

    #[test]
    fn test_rotation_without_kick() {
        let board = Board::new();
        let rotated = resolve_rotation(&board, &piece(4, 5, Orientation::Deg0)).unwrap();
        assert_eq!(rotated, piece(4, 5, Orientation::Deg90));
    }

    #[test]
    fn test_rotation_into_left_wall_kicks_right() {
        let board = Board::new();
        let rotated = resolve_rotation(&board, &piece(0, 5, Orientation::Deg90)).unwrap();
        assert_eq!(rotated, piece(2, 5, Orientation::Deg180));

        let rotated = resolve_rotation(&board, &piece(1, 5, Orientation::Deg90)).unwrap();
        assert_eq!(rotated, piece(2, 5, Orientation::Deg180));
    }

    #[test]
    fn test_rotation_into_right_wall_kicks_left() {
        let board = Board::new();
        let right = BOARD_WIDTH as i8 - 1;
        let rotated =
            resolve_rotation(&board, &piece(right, 5, Orientation::Deg270)).unwrap();
        assert_eq!(rotated, piece(right - 2, 5, Orientation::Deg0));
    }

    #[test]
    fn test_vertical_targets_never_kick() {
        let board = Board::new();
        // 0° -> 90° at the floor: the lower balls would leave the board.
        let floor = BOARD_HEIGHT as i8 - 1;
        assert_eq!(resolve_rotation(&board, &piece(4, floor, Orientation::Deg0)), None);
        // 180° -> 270° at the ceiling.
        assert_eq!(resolve_rotation(&board, &piece(4, 0, Orientation::Deg180)), None);
    }

    #[test]
    fn test_kick_blocked_by_balls() {
        let mut board = Board::new();
        board.set(2, 5, Some(c(6)));
        board.set(3, 5, Some(c(6)));
        assert_eq!(resolve_rotation(&board, &piece(0, 5, Orientation::Deg90)), None);
    }

    #[test]
    fn test_landing_y() {
        let mut board = Board::new();
        assert_eq!(landing_y(&board, &piece(4, 0, Orientation::Deg0)), 19);
        assert_eq!(landing_y(&board, &piece(4, 0, Orientation::Deg90)), 17);
        assert_eq!(landing_y(&board, &piece(4, 2, Orientation::Deg270)), 19);

        board.set(6, 12, Some(c(2)));
        assert_eq!(landing_y(&board, &piece(4, 0, Orientation::Deg0)), 11);
    }
}
