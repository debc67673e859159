//! Error types for the simulation core.

/// A lock tried to write a ball where none may go.
///
/// Collision checks run before every lock, so this only surfaces when that
/// contract has been broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("ball at ({x}, {y}) is outside the board")]
    OutOfBounds { x: i8, y: i8 },

    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: i8, y: i8 },
}

/// Rejected session operations. None of these change the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("game not started yet")]
    NotStarted,

    #[error("game already started")]
    AlreadyStarted,

    #[error("game is over")]
    GameOver,

    /// A lock hit an invalid cell; the session refuses everything but `reset`.
    #[error("session corrupted: {0}")]
    Corrupted(PlacementError),
}
