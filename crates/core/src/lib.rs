//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules, session state, and simulation logic
//! for the colour-ball puzzle. It has **no dependencies** on networking or I/O:
//!
//! - **Deterministic**: Same seed produces identical piece colors
//! - **Testable**: Unit tests for every rule, plus property tests at the workspace root
//! - **Portable**: Can be driven by the TCP adapter, a GUI, or a headless bot
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of colored balls with bounds checks and column compaction
//! - [`piece`]: 3-ball pieces, orientation offsets, and the spawn anchor
//! - [`collision`]: Fit checks, clockwise rotation with wall kicks, landing row
//! - [`matcher`]: Same-color runs of 3+ in four directions
//! - [`gravity`]: Per-column settling after a clear
//! - [`scoring`]: Run points, chain bonus, and level curve
//! - [`rng`]: Seeded color draws (distinct colors per piece)
//! - [`session`]: The orchestrator, including the staged-clear protocol
//! - [`snapshot`]: Plain-data view of a session for adapters
//!
//! # Game Rules
//!
//! - Pieces are three balls in a line, spawned at (4, 0) extending right.
//! - `rotate` turns clockwise; a blocked turn to 180° tries shifting right by
//!   1 then 2, a blocked turn to 0° tries shifting left. Other turns never kick.
//! - Any horizontal, vertical, or diagonal run of three or more balls of one
//!   color is removed; balls above fall straight down and may form chains.
//! - The game ends when a freshly spawned piece overlaps the stack.
//!
//! # Example
//!
//! ```
//! use colour_balls_core::GameSession;
//! use colour_balls_types::Action;
//!
//! let mut game = GameSession::new(12345);
//! game.start_game().unwrap();
//!
//! game.apply_action(Action::MoveRight, false).unwrap();
//! game.apply_action(Action::Rotate, false).unwrap();
//! let snap = game.apply_action(Action::HardDrop, false).unwrap();
//!
//! // Three distinct colors can never match on their own.
//! assert_eq!(snap.score, 0);
//! assert_eq!(snap.piece_id, 2);
//! ```

pub mod board;
pub mod collision;
pub mod error;
pub mod gravity;
pub mod matcher;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use colour_balls_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, U8Grid};
pub use collision::{fits, landing_y, resolve_rotation};
pub use error::{PlacementError, SessionError};
pub use gravity::apply_gravity;
pub use matcher::{find_matches, CellPos, MatchResult};
pub use piece::{Piece, PieceColors};
pub use rng::{ColorQueue, SimpleRng};
pub use scoring::{calculate_level, committed_clear_score, immediate_clear_score};
pub use session::{GameSession, SessionState};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
