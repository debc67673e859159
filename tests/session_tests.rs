//! Session tests - lifecycle, actions, staged clears, and failure handling
//! through the public API.

use colour_balls::core::{Board, GameSession, SessionError, SessionState};
use colour_balls::types::{Action, BallColor, Orientation, BOARD_HEIGHT, BOARD_WIDTH};

/// Fill rows `from..BOARD_HEIGHT` with a pattern that has no two equal
/// neighbours in any of the four match directions.
fn matchless_board(from: u8) -> Board {
    let mut board = Board::new();
    for y in from..BOARD_HEIGHT {
        for x in 0..BOARD_WIDTH {
            let id = (x + 2 * y) % 6 + 1;
            board.set(x as i8, y as i8, BallColor::new(id));
        }
    }
    board
}

/// Colors of the first piece a session with `seed` will spawn.
fn first_piece_colors(seed: u32) -> [BallColor; 3] {
    let mut session = GameSession::new(seed);
    session.start_game().unwrap().active.unwrap().colors
}

#[test]
fn test_lifecycle_states() {
    let mut session = GameSession::new(42);
    assert_eq!(session.state(), SessionState::NotStarted);

    session.start_game().unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(session.start_game(), Err(SessionError::AlreadyStarted));

    session.reset();
    assert_eq!(session.state(), SessionState::NotStarted);
}

#[test]
fn test_first_hard_drop_lands_on_floor() {
    let mut session = GameSession::new(42);
    let start = session.start_game().unwrap();
    let colors = start.active.unwrap().colors;
    let preview = start.next_colors.unwrap();

    let snap = session.apply_action(Action::HardDrop, true).unwrap();

    for (i, color) in colors.iter().enumerate() {
        assert_eq!(snap.board[19][4 + i], color.get());
    }
    assert!(snap.matched.is_empty());
    assert_eq!(snap.score, 0);

    // The preview became the new piece at the spawn anchor.
    let active = snap.active.unwrap();
    assert_eq!(active.colors, preview);
    assert_eq!((active.x, active.y), (4, 0));
    assert_eq!(active.orientation, Orientation::Deg0);
}

#[test]
fn test_completing_a_run_stages_it() {
    let seed = 9;
    let colors = first_piece_colors(seed);

    let mut board = Board::new();
    board.set(3, 19, Some(colors[0]));
    board.set(4, 19, Some(colors[0]));

    let mut session = GameSession::with_board(seed, board);
    session.start_game().unwrap();
    session.apply_action(Action::MoveRight, false).unwrap();
    let snap = session.apply_action(Action::HardDrop, true).unwrap();

    assert_eq!(snap.matched, vec![(19, 3), (19, 4), (19, 5)]);
    assert!(snap.awaiting_commit());
    assert!(snap.active.is_none());
    let ev = snap.last_event.unwrap();
    assert!(ev.locked && ev.staged);
    assert_eq!(ev.runs, 1);

    // Nothing else moves until the clear is committed.
    let again = session.apply_action(Action::MoveLeft, true).unwrap();
    assert_eq!(again.board, snap.board);

    let snap = session.commit_staged_clear().unwrap();
    assert!(snap.matched.is_empty());
    assert_eq!(snap.score, 30);
    assert_eq!(snap.board[19][3], 0);
    assert_eq!(snap.board[19][6], colors[1].get());
    assert_eq!(snap.board[19][7], colors[2].get());
    assert!(snap.active.is_some());
}

#[test]
fn test_completing_a_run_immediately() {
    let seed = 9;
    let colors = first_piece_colors(seed);

    let mut board = Board::new();
    board.set(3, 19, Some(colors[0]));
    board.set(4, 19, Some(colors[0]));

    let mut session = GameSession::with_board(seed, board);
    session.start_game().unwrap();
    session.apply_action(Action::MoveRight, false).unwrap();
    let snap = session.apply_action(Action::HardDrop, false).unwrap();

    assert!(snap.matched.is_empty());
    assert_eq!(snap.score, 10);
    assert_eq!(snap.last_event.map(|e| e.cells_cleared), Some(3));
    assert!(snap.active.is_some());
}

#[test]
fn test_rejected_moves_report_not_applied() {
    let mut session = GameSession::new(5);
    session.start_game().unwrap();

    let mut moved = 0;
    while session.try_action(Action::MoveLeft, false).unwrap() {
        moved += 1;
    }
    assert_eq!(moved, 4);
    assert_eq!(session.current_piece().map(|p| p.x), Some(0));

    let before = session.snapshot();
    assert_eq!(session.try_action(Action::MoveLeft, false), Ok(false));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_rotation_at_left_wall_kicks_right() {
    let mut session = GameSession::new(5);
    session.start_game().unwrap();
    for _ in 0..4 {
        session.apply_action(Action::MoveLeft, false).unwrap();
    }
    // 0° -> 90° fits in place at x=0.
    assert_eq!(session.try_action(Action::Rotate, false), Ok(true));
    // 90° -> 180° needs the two-cell kick.
    assert_eq!(session.try_action(Action::Rotate, false), Ok(true));
    let piece = session.current_piece().unwrap();
    assert_eq!(piece.orientation, Orientation::Deg180);
    assert_eq!(piece.x, 2);
}

#[test]
fn test_game_over_and_reset() {
    let mut session = GameSession::with_board(3, matchless_board(1));
    session.start_game().unwrap();
    assert!(!session.game_over());

    // The drop fills row 0 without matching, so the next spawn is blocked.
    let snap = session.apply_action(Action::HardDrop, false).unwrap();
    assert!(snap.game_over);
    assert!(!snap.playable());
    assert_eq!(session.state(), SessionState::GameOver);

    for action in Action::ALL {
        assert_eq!(session.apply_action(action, false), Err(SessionError::GameOver));
    }
    assert_eq!(session.start_game(), Err(SessionError::GameOver));

    let snap = session.reset();
    assert!(!snap.started);
    assert!(!snap.game_over);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.level, 1);
    assert!(snap.board.iter().flatten().all(|&v| v == 0));
    assert!(session.start_game().unwrap().playable());
}

#[test]
fn test_blocked_spawn_on_start_ends_game() {
    let mut board = Board::new();
    board.set(5, 0, BallColor::new(1));
    let mut session = GameSession::with_board(1, board);

    let snap = session.start_game().unwrap();
    assert!(snap.started);
    assert!(snap.game_over);
    // The blocked piece stays visible.
    assert!(snap.active.is_some());
}

#[test]
fn test_blocked_spawn_is_game_over_not_corruption() {
    let mut board = Board::new();
    board.set(5, 0, BallColor::new(1));
    let mut session = GameSession::with_board(1, board);
    let before = session.start_game().unwrap();
    assert!(before.game_over);

    // The blocked piece overlaps (5, 0); dropping it must be refused, not written.
    for action in [Action::HardDrop, Action::MoveDown] {
        assert_eq!(session.apply_action(action, false), Err(SessionError::GameOver));
    }
    assert!(!session.is_corrupted());
    assert_eq!(session.board().filled_count(), 1);
    assert_eq!(session.snapshot(), before);

    session.reset();
    assert_eq!(session.state(), SessionState::NotStarted);
}

#[test]
fn test_soft_drop_onto_run_stages_until_commit() {
    let seed = 9;
    let colors = first_piece_colors(seed);

    let mut board = Board::new();
    board.set(3, 19, Some(colors[0]));
    board.set(4, 19, Some(colors[0]));

    let mut session = GameSession::with_board(seed, board);
    session.start_game().unwrap();
    session.apply_action(Action::MoveRight, true).unwrap();

    let mut steps = 0;
    while session.current_piece().is_some() {
        assert_eq!(session.try_action(Action::MoveDown, true), Ok(true));
        steps += 1;
        assert!(steps <= BOARD_HEIGHT, "piece never landed");
    }
    // 19 steps down plus the step that locks.
    assert_eq!(steps, BOARD_HEIGHT);

    let snap = session.snapshot();
    assert_eq!(snap.matched, vec![(19, 3), (19, 4), (19, 5)]);
    assert!(snap.active.is_none());
    assert_eq!(snap.piece_id, 1);

    let snap = session.commit_staged_clear().unwrap();
    assert!(snap.matched.is_empty());
    assert_eq!(snap.score, 30);
    assert_eq!(snap.piece_id, 2);
    assert!(snap.playable());
}

#[test]
fn test_same_seed_same_game() {
    let script = [
        Action::MoveLeft,
        Action::Rotate,
        Action::HardDrop,
        Action::MoveRight,
        Action::MoveRight,
        Action::HardDrop,
        Action::Rotate,
        Action::MoveDown,
        Action::HardDrop,
    ];

    let play = |seed: u32| {
        let mut session = GameSession::new(seed);
        session.start_game().unwrap();
        for action in script {
            session.apply_action(action, false).unwrap();
        }
        session.snapshot()
    };

    assert_eq!(play(77), play(77));
    assert_ne!(play(77).board, play(78).board);
}

#[test]
fn test_reset_keeps_color_stream_running() {
    let fresh = GameSession::new(11).start_game().unwrap();

    let mut session = GameSession::new(11);
    session.start_game().unwrap();
    session.reset();
    let restarted = session.start_game().unwrap();

    assert_eq!(restarted.piece_id, 1);
    assert_ne!(restarted.seed, fresh.seed);
}
