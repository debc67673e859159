//! Colour Balls (workspace facade crate).
//!
//! Re-exports the `colour_balls::{core,adapter,types}` public API while the
//! implementation lives in dedicated crates under `crates/`.

pub use colour_balls_adapter as adapter;
pub use colour_balls_core as core;
pub use colour_balls_types as types;
