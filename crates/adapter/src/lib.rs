//! Adapter module - session control via TCP socket with JSON protocol
//!
//! This crate exposes game sessions to an external client (a front end, a
//! bot, or a test harness) through a TCP socket. It only parses requests,
//! calls the session operations, and serializes the resulting snapshot.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Requests**: One JSON object per line, each with a strictly increasing `seq`
//! 3. **Replies**: Exactly one `state` or `error` line per request, echoing `seq`
//!
//! Requests may name a `session`; sessions are created on first use and live
//! until the process exits. Requests without one go to `"default"`.
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **start**: Start the session's game
//! - **action**: `move_left`, `move_right`, `rotate`, `move_down`, `hard_drop`
//!   (optional `deferred` flag for drops)
//! - **clear_matches**: Commit a staged clear
//! - **reset**: Back to an empty, not-started game
//! - **state**: Read the current snapshot
//!
//! ## Server → Client
//!
//! - **state**: Full session snapshot plus whether the request changed anything
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `COLOUR_BALLS_HOST`: Bind address (default: "127.0.0.1")
//! - `COLOUR_BALLS_PORT`: Port number (default: 7878)
//! - `COLOUR_BALLS_SEED`: Seed of the first session (default: 1)
//! - `COLOUR_BALLS_DEFERRED_CLEARS`: Drops stage matches by default (default: true)
//! - `COLOUR_BALLS_MAX_SESSIONS`: Session limit (default: 64)
//! - `COLOUR_BALLS_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"start","seq":1}
//! Server -> Client: {"type":"state","seq":1,"ts":1700000000000,"session":"default","applied":true,"state":{...}}
//! Client -> Server: {"type":"action","seq":2,"action":"hard_drop"}
//! Server -> Client: {"type":"state","seq":2,...,"state":{...,"matchedPositions":[[19,3],[19,4],[19,5]],...}}
//! Client -> Server: {"type":"clear_matches","seq":3}
//! ```
//!
//! # Testing
//!
//! Connect to the adapter using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"start","seq":1}
//! ```

pub mod protocol;
pub mod server;

pub use colour_balls_core as core;
pub use colour_balls_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use server::*;
