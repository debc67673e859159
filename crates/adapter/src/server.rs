//! TCP server for the session adapter
//!
//! Handles incoming connections and routes each request to its session.
//! Uses tokio for async networking.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::GameSession;
use crate::protocol::*;
use crate::types::Action;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seed of the first session; later sessions offset it by creation order.
    pub seed: u32,
    /// Drops stage matches unless the request says otherwise.
    pub deferred_clears: bool,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            seed: 1,
            deferred_clears: true,
            max_sessions: 64,
        }
    }
}

fn env_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("COLOUR_BALLS_HOST").unwrap_or(defaults.host);
        let port = env::var("COLOUR_BALLS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let seed = env::var("COLOUR_BALLS_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.seed);

        let deferred_clears = env::var("COLOUR_BALLS_DEFERRED_CLEARS")
            .ok()
            .map(|s| env_flag(s.trim()))
            .unwrap_or(defaults.deferred_clears);

        let max_sessions = env::var("COLOUR_BALLS_MAX_SESSIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_sessions);

        Self {
            host,
            port,
            seed,
            deferred_clears,
            max_sessions,
        }
    }

    /// Check if the server is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("COLOUR_BALLS_DISABLED")
            .map(|v| env_flag(&v))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

pub type SharedSession = Arc<Mutex<GameSession>>;

/// Sessions keyed by id. Each session is locked on its own, so requests to
/// different sessions never wait on each other.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
    seed: u32,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(seed: u32, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            seed,
            max_sessions,
        }
    }

    /// Look up a session, creating it on first use.
    ///
    /// Returns None when the id is new and the registry is full.
    pub async fn get_or_create(&self, id: &str) -> Option<SharedSession> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Some(Arc::clone(session));
        }

        let mut sessions = self.sessions.write().await;
        // Another connection may have created it between the two locks.
        if let Some(session) = sessions.get(id) {
            return Some(Arc::clone(session));
        }
        if sessions.len() >= self.max_sessions {
            return None;
        }

        let seed = self.seed.wrapping_add(sessions.len() as u32);
        let session = Arc::new(Mutex::new(GameSession::new(seed)));
        sessions.insert(id.to_string(), Arc::clone(&session));
        info!(session = id, seed, "session created");
        Some(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    registry: SessionRegistry,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let registry = SessionRegistry::new(config.seed, config.max_sessions);
        Self { config, registry }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

/// Per-connection sequencing: `seq` must be strictly increasing.
#[derive(Debug, Default)]
pub struct Connection {
    last_seq: Option<u64>,
}

impl Connection {
    fn check_and_update_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    if ServerConfig::is_disabled() {
        info!("adapter disabled via COLOUR_BALLS_DISABLED");
        return Ok(());
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!(%bound, deferred_clears = config.deferred_clears, "TCP server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);

        // Spawn task to handle this client
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let mut conn = Connection::default();

    let mut line = String::new();
    let mut buf: Vec<u8> = Vec::with_capacity(4096);

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = handle_line(&state, &mut conn, trimmed).await;
        if let Reply::Error(ref err) = reply {
            debug!(client_id, seq = err.seq, code = ?err.code, "request rejected");
        }

        buf.clear();
        serde_json::to_writer(&mut buf, &reply)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// A parsed message that targets a session.
enum Request<'a> {
    Start,
    Action(&'a ActionRequest),
    ClearMatches,
    Reset,
    State,
}

/// Handle one request line and build the reply.
pub async fn handle_line(state: &ServerState, conn: &mut Connection, line: &str) -> Reply {
    let msg = match parse_message(line) {
        Ok(msg) => msg,
        Err(e) => {
            let seq = extract_seq_best_effort(line).unwrap_or(0);
            return Reply::Error(create_error(
                seq,
                ErrorCode::InvalidMessage,
                &format!("JSON parse error: {}", e),
            ));
        }
    };

    let seq = msg.seq();

    // Sequencing: enforce monotonic seq per connection.
    if !conn.check_and_update_seq(seq) {
        return Reply::Error(create_error(
            seq,
            ErrorCode::OutOfOrder,
            "seq must be strictly increasing",
        ));
    }

    let request = match &msg {
        ParsedMessage::Start(_) => Request::Start,
        ParsedMessage::Action(req) => Request::Action(req),
        ParsedMessage::ClearMatches(_) => Request::ClearMatches,
        ParsedMessage::Reset(_) => Request::Reset,
        ParsedMessage::State(_) => Request::State,
        ParsedMessage::Unknown(unknown) => {
            return Reply::Error(create_error(
                seq,
                ErrorCode::InvalidMessage,
                &format!("Unknown message type: {}", unknown.msg_type),
            ));
        }
    };

    let session_id = msg.session();
    let Some(session) = state.registry.get_or_create(session_id).await else {
        let sessions = state.registry.len().await;
        warn!(
            session = session_id,
            sessions,
            "session limit reached"
        );
        return Reply::Error(create_error(
            seq,
            ErrorCode::TooManySessions,
            &format!("session limit of {} reached", state.config.max_sessions),
        ));
    };
    let mut session = session.lock().await;

    let outcome = match request {
        Request::Start => session.start_game().map(|snap| (true, snap)),
        Request::Action(req) => {
            let Some(action) = Action::from_str(&req.action) else {
                let mut err = create_error(
                    seq,
                    ErrorCode::UnknownAction,
                    &format!("Unknown action: {}", req.action),
                );
                err.state = Some(StatePayload::from(&session.snapshot()));
                return Reply::Error(err);
            };
            let deferred = req
                .deferred
                .unwrap_or(action.can_lock() && state.config.deferred_clears);
            session
                .try_action(action, deferred)
                .map(|applied| (applied, session.snapshot()))
        }
        Request::ClearMatches => {
            let staged = !session.pending_matches().is_empty();
            session.commit_staged_clear().map(|snap| (staged, snap))
        }
        Request::Reset => Ok((true, session.reset())),
        Request::State => Ok((false, session.snapshot())),
    };

    match outcome {
        Ok((applied, snap)) => Reply::State(create_state(seq, session_id, applied, &snap)),
        Err(err) => Reply::Error(create_session_error(seq, err, &session.snapshot())),
    }
}
