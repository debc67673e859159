//! Protocol module - JSON message types for the session adapter
//!
//! Line-delimited JSON. Every inbound message has: type, seq (sequence number),
//! and an optional session id. Every outbound message has: type, seq (echoing
//! the request), ts (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{ActiveSnapshot, GameSnapshot, SessionError, U8Grid};
use crate::types::{LockEvent, PIECE_LENGTH};

/// Session used when a message does not name one.
pub const DEFAULT_SESSION: &str = "default";

// ============== Client -> Server Messages ==============

/// Header shared by `start`, `clear_matches`, `reset`, and `state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Gameplay action request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Wire name of the action (`move_left`, `hard_drop`, ...). Validated by
    /// the server so unknown names get a dedicated error code.
    pub action: String,
    /// Stage matches instead of clearing them. Defaults per server config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred: Option<bool>,
}

/// Parsed incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Start(SessionRequest),
    Action(ActionRequest),
    ClearMatches(SessionRequest),
    Reset(SessionRequest),
    State(SessionRequest),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
    pub msg_type: String,
}

fn session_or_default(session: &Option<String>) -> &str {
    match session.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_SESSION,
    }
}

impl ParsedMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ParsedMessage::Start(m)
            | ParsedMessage::ClearMatches(m)
            | ParsedMessage::Reset(m)
            | ParsedMessage::State(m) => m.seq,
            ParsedMessage::Action(m) => m.seq,
            ParsedMessage::Unknown(m) => m.seq,
        }
    }

    /// Target session id; empty or missing ids map to [`DEFAULT_SESSION`].
    pub fn session(&self) -> &str {
        match self {
            ParsedMessage::Start(m)
            | ParsedMessage::ClearMatches(m)
            | ParsedMessage::Reset(m)
            | ParsedMessage::State(m) => session_or_default(&m.session),
            ParsedMessage::Action(m) => session_or_default(&m.session),
            ParsedMessage::Unknown(_) => DEFAULT_SESSION,
        }
    }
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[serde(rename = "state")]
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_message")]
    InvalidMessage,
    #[serde(rename = "unknown_action")]
    UnknownAction,
    #[serde(rename = "not_started")]
    NotStarted,
    #[serde(rename = "already_started")]
    AlreadyStarted,
    #[serde(rename = "game_over")]
    GameOver,
    #[serde(rename = "session_corrupted")]
    SessionCorrupted,
    #[serde(rename = "too_many_sessions")]
    TooManySessions,
    #[serde(rename = "out_of_order")]
    OutOfOrder,
}

impl From<SessionError> for ErrorCode {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::NotStarted => ErrorCode::NotStarted,
            SessionError::AlreadyStarted => ErrorCode::AlreadyStarted,
            SessionError::GameOver => ErrorCode::GameOver,
            SessionError::Corrupted(_) => ErrorCode::SessionCorrupted,
        }
    }
}

/// Current piece as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiecePayload {
    pub colors: [u8; PIECE_LENGTH],
    pub x: i8,
    pub y: i8,
    /// Degrees clockwise from +x: 0, 90, 180, or 270.
    pub orientation: u16,
}

impl From<ActiveSnapshot> for PiecePayload {
    fn from(value: ActiveSnapshot) -> Self {
        Self {
            colors: value.colors.map(|c| c.get()),
            x: value.x,
            y: value.y,
            orientation: value.orientation.degrees(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastEventPayload {
    pub locked: bool,
    pub staged: bool,
    pub cells_cleared: u32,
    pub runs: u32,
    pub chains: u32,
    pub score_delta: u32,
}

impl From<LockEvent> for LastEventPayload {
    fn from(value: LockEvent) -> Self {
        Self {
            locked: value.locked,
            staged: value.staged,
            cells_cleared: value.cells_cleared,
            runs: value.runs,
            chains: value.chains,
            score_delta: value.score_delta,
        }
    }
}

/// Session snapshot payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    /// Row-major, row 0 at the top; 0 is empty, 1..=6 a ball color.
    pub board: U8Grid,
    pub current_piece: Option<PiecePayload>,
    pub next_piece_colors: Option<[u8; PIECE_LENGTH]>,
    pub score: u32,
    pub level: u32,
    pub game_over: bool,
    pub game_started: bool,
    /// Staged cells as `[row, col]`, sorted row-major.
    pub matched_positions: Vec<[u8; 2]>,
    pub last_event: Option<LastEventPayload>,
}

impl From<&GameSnapshot> for StatePayload {
    fn from(snap: &GameSnapshot) -> Self {
        Self {
            board: snap.board,
            current_piece: snap.active.map(PiecePayload::from),
            next_piece_colors: snap.next_colors.map(|colors| colors.map(|c| c.get())),
            score: snap.score,
            level: snap.level,
            game_over: snap.game_over,
            game_started: snap.started,
            matched_positions: snap.matched.iter().map(|&(r, c)| [r, c]).collect(),
            last_event: snap.last_event.map(LastEventPayload::from),
        }
    }
}

/// Reply to every successfully handled request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: StateType,
    pub seq: u64,
    pub ts: u64,
    pub session: String,
    /// Whether the request changed the session.
    pub applied: bool,
    pub state: StatePayload,
}

/// Error reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
    /// Unchanged session state, when the request reached a session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StatePayload>,
}

/// Any outbound line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    State(StateMessage),
    Error(ErrorMessage),
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "start")]
        Start(SessionRequest),
        #[serde(rename = "action")]
        Action(ActionRequest),
        #[serde(rename = "clear_matches")]
        ClearMatches(SessionRequest),
        #[serde(rename = "reset")]
        Reset(SessionRequest),
        #[serde(rename = "state")]
        State(SessionRequest),
    }

    const KNOWN: [&str; 5] = ["start", "action", "clear_matches", "reset", "state"];

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Start(m)) => Ok(ParsedMessage::Start(m)),
        Ok(InboundMessage::Action(m)) => Ok(ParsedMessage::Action(m)),
        Ok(InboundMessage::ClearMatches(m)) => Ok(ParsedMessage::ClearMatches(m)),
        Ok(InboundMessage::Reset(m)) => Ok(ParsedMessage::Reset(m)),
        Ok(InboundMessage::State(m)) => Ok(ParsedMessage::State(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some(t) if !KNOWN.contains(&t.as_str()) => {
                    Ok(ParsedMessage::Unknown(UnknownMessage {
                        seq: header.seq.unwrap_or(0),
                        msg_type: t,
                    }))
                }
                _ => Err(e),
            }
        }
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

/// Create a state reply
pub fn create_state(seq: u64, session: &str, applied: bool, snap: &GameSnapshot) -> StateMessage {
    StateMessage {
        msg_type: StateType::State,
        seq,
        ts: current_timestamp_ms(),
        session: session.to_string(),
        applied,
        state: StatePayload::from(snap),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
        state: None,
    }
}

/// Create an error message that carries the (unchanged) session state
pub fn create_session_error(seq: u64, err: SessionError, snap: &GameSnapshot) -> ErrorMessage {
    ErrorMessage {
        state: Some(StatePayload::from(snap)),
        ..create_error(seq, ErrorCode::from(err), &err.to_string())
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameSession, PlacementError};

    #[test]
    fn test_parse_start() {
        let json = r#"{"type":"start","seq":1}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Start(msg) => {
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.session, None);
            }
            other => panic!("Expected Start message, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_action_with_session() {
        let json = r#"{"type":"action","seq":7,"session":"p2","action":"hard_drop","deferred":false}"#;
        let msg = parse_message(json).unwrap();
        assert_eq!(msg.seq(), 7);
        assert_eq!(msg.session(), "p2");
        match msg {
            ParsedMessage::Action(a) => {
                assert_eq!(a.action, "hard_drop");
                assert_eq!(a.deferred, Some(false));
            }
            other => panic!("Expected Action message, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_session_maps_to_default() {
        let msg = parse_message(r#"{"type":"state","seq":2,"session":""}"#).unwrap();
        assert_eq!(msg.session(), DEFAULT_SESSION);
    }

    #[test]
    fn test_parse_unknown_type() {
        let msg = parse_message(r#"{"type":"hold","seq":9}"#).unwrap();
        assert_eq!(
            msg,
            ParsedMessage::Unknown(UnknownMessage {
                seq: 9,
                msg_type: "hold".to_string()
            })
        );
    }

    #[test]
    fn test_parse_known_type_missing_field_is_error() {
        assert!(parse_message(r#"{"type":"action","seq":3}"#).is_err());
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
        assert_eq!(extract_seq_best_effort(r#"{"seq":"a"}"#), None);
    }

    #[test]
    fn test_create_error() {
        let err = create_error(5, ErrorCode::UnknownAction, "Unknown action: hold");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["seq"], 5);
        assert_eq!(json["code"], "unknown_action");
        assert!(json.get("state").is_none());
    }

    #[test]
    fn test_session_error_codes() {
        assert_eq!(ErrorCode::from(SessionError::NotStarted), ErrorCode::NotStarted);
        assert_eq!(
            ErrorCode::from(SessionError::Corrupted(PlacementError::Occupied { x: 0, y: 0 })),
            ErrorCode::SessionCorrupted
        );
        let json = serde_json::to_value(ErrorCode::TooManySessions).unwrap();
        assert_eq!(json, "too_many_sessions");
    }

    #[test]
    fn test_state_payload_keys_are_camel_case() {
        let mut session = GameSession::new(1);
        let snap = session.start_game().unwrap();
        let msg = create_state(1, DEFAULT_SESSION, true, &snap);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "state");
        assert_eq!(json["applied"], true);
        let state = &json["state"];
        for key in [
            "board",
            "currentPiece",
            "nextPieceColors",
            "score",
            "level",
            "gameOver",
            "gameStarted",
            "matchedPositions",
            "lastEvent",
        ] {
            assert!(state.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(state["board"].as_array().unwrap().len(), 20);
        assert_eq!(state["board"][0].as_array().unwrap().len(), 10);
        assert_eq!(state["currentPiece"]["x"], 4);
        assert_eq!(state["currentPiece"]["orientation"], 0);
        assert_eq!(
            state["currentPiece"]["colors"].as_array().unwrap().len(),
            PIECE_LENGTH
        );
        assert_eq!(state["nextPieceColors"].as_array().unwrap().len(), PIECE_LENGTH);
        assert_eq!(state["level"], 1);
    }

    #[test]
    fn test_session_error_carries_state() {
        let session = GameSession::new(1);
        let err = create_session_error(3, SessionError::NotStarted, &session.snapshot());
        assert_eq!(err.code, ErrorCode::NotStarted);
        assert_eq!(err.message, "game not started yet");
        assert_eq!(err.state.map(|s| s.game_started), Some(false));
    }

    #[test]
    fn test_state_message_roundtrip() {
        let snap = GameSession::new(3).snapshot();
        let msg = create_state(4, "a", false, &snap);
        let json = serde_json::to_string(&msg).unwrap();
        let back: StateMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
