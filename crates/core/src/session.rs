//! Game session module - manages the complete game state
//!
//! This module ties together all core components: board, pieces, collision,
//! matching, gravity, RNG, and scoring. It handles piece movement, rotation,
//! locking, the staged-clear protocol, and the game lifecycle.
//!
//! A lock is resolved in one of two ways:
//! - **Immediate**: matches are cleared, gravity runs, and chain reactions are
//!   resolved before the next piece spawns.
//! - **Deferred**: matches are only staged in `pending_matches` so a front end
//!   can highlight them. The caller then runs [`GameSession::commit_staged_clear`]
//!   once per highlight until no chain remains, at which point the next piece spawns.

use std::collections::BTreeSet;

use tracing::{debug, error, info};

use crate::collision::{fits, landing_y, resolve_rotation};
use crate::error::{PlacementError, SessionError};
use crate::gravity::apply_gravity;
use crate::matcher::{find_matches, CellPos};
use crate::piece::{Piece, PieceColors};
use crate::rng::ColorQueue;
use crate::scoring::{calculate_level, committed_clear_score, immediate_clear_score};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{Action, LockEvent};
use crate::Board;

/// Coarse lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    NotStarted,
    Running,
    GameOver,
}

/// Bookkeeping for a staged clear that is waiting for commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct StagedClear {
    /// Cells staged by the lock that started this clear.
    staged_cells: u32,
    /// Chain passes found so far.
    chains: u32,
    /// Cells removed so far.
    cleared: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current: Option<Piece>,
    next_colors: Option<PieceColors>,
    colors: ColorQueue,
    /// Monotonic id for spawned pieces.
    piece_id: u32,
    score: u32,
    level: u32,
    game_over: bool,
    started: bool,
    pending_matches: BTreeSet<CellPos>,
    stage: Option<StagedClear>,
    /// Set when a lock hit an invalid cell.
    corrupted: Option<PlacementError>,
    /// Last lock/clear event (consumed by observers).
    last_event: Option<LockEvent>,
}

impl GameSession {
    /// Create a new session with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::with_board(seed, Board::new())
    }

    /// Create a new session on a prepared board (puzzle setups, tests, benches).
    pub fn with_board(seed: u32, board: Board) -> Self {
        Self {
            board,
            current: None,
            next_colors: None,
            colors: ColorQueue::new(seed),
            piece_id: 0,
            score: 0,
            level: 1,
            game_over: false,
            started: false,
            pending_matches: BTreeSet::new(),
            stage: None,
            corrupted: None,
            last_event: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.game_over {
            SessionState::GameOver
        } else if self.started {
            SessionState::Running
        } else {
            SessionState::NotStarted
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_corrupted(&self) -> bool {
        self.corrupted.is_some()
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    pub fn next_colors(&self) -> Option<PieceColors> {
        self.next_colors
    }

    pub fn pending_matches(&self) -> &BTreeSet<CellPos> {
        &self.pending_matches
    }

    /// Take and clear the last lock/clear event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);

        out.active = self.current.map(ActiveSnapshot::from);
        out.next_colors = self.next_colors;
        out.score = self.score;
        out.level = self.level;
        out.game_over = self.game_over;
        out.started = self.started;
        out.piece_id = self.piece_id;
        out.seed = self.colors.seed();
        out.matched.clear();
        out.matched.extend(self.pending_matches.iter().copied());
        out.last_event = self.last_event;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn ensure_healthy(&self) -> Result<(), SessionError> {
        match self.corrupted {
            Some(err) => Err(SessionError::Corrupted(err)),
            None => Ok(()),
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        self.ensure_healthy()?;
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if self.game_over {
            return Err(SessionError::GameOver);
        }
        Ok(())
    }

    /// Start the game: generate the first preview and spawn the first piece
    pub fn start_game(&mut self) -> Result<GameSnapshot, SessionError> {
        self.ensure_healthy()?;
        if self.game_over {
            return Err(SessionError::GameOver);
        }
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }

        self.next_colors = Some(self.colors.draw());
        self.started = true;
        info!(seed = self.colors.seed(), "game started");
        self.spawn_piece();
        Ok(self.snapshot())
    }

    /// Return to the initial empty-board, zero-score, not-started state.
    ///
    /// Always legal. The color stream keeps running, so a reset game does not
    /// replay the previous piece sequence.
    pub fn reset(&mut self) -> GameSnapshot {
        self.board.clear();
        self.current = None;
        self.next_colors = None;
        self.piece_id = 0;
        self.score = 0;
        self.level = 1;
        self.game_over = false;
        self.started = false;
        self.pending_matches.clear();
        self.stage = None;
        self.corrupted = None;
        self.last_event = None;
        info!("game reset");
        self.snapshot()
    }

    /// Apply a gameplay action and return the resulting snapshot.
    pub fn apply_action(
        &mut self,
        action: Action,
        deferred: bool,
    ) -> Result<GameSnapshot, SessionError> {
        self.try_action(action, deferred)?;
        Ok(self.snapshot())
    }

    /// Apply a gameplay action. Returns whether the session changed.
    ///
    /// A move or rotation into a collision is not an error; it simply reports
    /// `false` and leaves everything untouched.
    pub fn try_action(&mut self, action: Action, deferred: bool) -> Result<bool, SessionError> {
        self.ensure_running()?;
        if self.current.is_none() {
            return Ok(false);
        }

        let applied = match action {
            Action::MoveLeft => self.try_move(-1),
            Action::MoveRight => self.try_move(1),
            Action::Rotate => self.try_rotate(),
            Action::MoveDown => self.move_down(deferred)?,
            Action::HardDrop => self.hard_drop(deferred)?,
        };

        debug!(action = action.as_str(), applied, "action");
        Ok(applied)
    }

    /// Try to shift the current piece horizontally
    pub(crate) fn try_move(&mut self, dx: i8) -> bool {
        let Some(active) = self.current else {
            return false;
        };

        let moved = active.shifted(dx, 0);
        if fits(&self.board, &moved) {
            self.current = Some(moved);
            return true;
        }
        false
    }

    /// Try to rotate the current piece clockwise, with wall kicks
    pub(crate) fn try_rotate(&mut self) -> bool {
        let Some(active) = self.current else {
            return false;
        };

        match resolve_rotation(&self.board, &active) {
            Some(rotated) => {
                self.current = Some(rotated);
                true
            }
            None => false,
        }
    }

    /// Soft drop: move down one row, or lock if the piece has landed.
    pub(crate) fn move_down(&mut self, deferred: bool) -> Result<bool, SessionError> {
        let Some(active) = self.current else {
            return Ok(false);
        };

        let lowered = active.shifted(0, 1);
        if fits(&self.board, &lowered) {
            self.current = Some(lowered);
            return Ok(true);
        }

        self.lock_piece(deferred)?;
        Ok(true)
    }

    /// Drop the current piece to the lowest free row and lock it.
    ///
    /// The next piece appears only once the resulting clears are resolved.
    pub(crate) fn hard_drop(&mut self, deferred: bool) -> Result<bool, SessionError> {
        let Some(active) = self.current else {
            return Ok(false);
        };

        let y = landing_y(&self.board, &active);
        self.current = Some(Piece { y, ..active });
        self.lock_piece(deferred)?;
        Ok(true)
    }

    /// Write the current piece into the board and resolve matches.
    pub(crate) fn lock_piece(&mut self, deferred: bool) -> Result<(), SessionError> {
        self.ensure_running()?;
        let Some(active) = self.current.take() else {
            return Ok(());
        };

        if let Err(err) = self.board.place(&active.cells()) {
            error!(%err, x = active.x, y = active.y, "lock hit an invalid cell; session is now unusable");
            self.current = Some(active);
            self.corrupted = Some(err);
            return Err(SessionError::Corrupted(err));
        }

        debug!(
            x = active.x,
            y = active.y,
            orientation = active.orientation.degrees(),
            "piece locked"
        );
        self.resolve_after_lock(deferred);
        Ok(())
    }

    /// Find matches after a lock and either stage them or resolve them fully.
    fn resolve_after_lock(&mut self, deferred: bool) {
        let found = find_matches(&self.board);

        if found.is_empty() {
            self.pending_matches.clear();
            self.last_event = Some(LockEvent {
                locked: true,
                ..LockEvent::default()
            });
            self.spawn_piece();
            return;
        }

        info!(cells = found.cells.len(), runs = found.runs, deferred, "matches found");

        if deferred {
            self.stage = Some(StagedClear {
                staged_cells: found.cells.len() as u32,
                ..StagedClear::default()
            });
            self.pending_matches = found.cells;
            self.last_event = Some(LockEvent {
                locked: true,
                staged: true,
                runs: found.runs,
                ..LockEvent::default()
            });
            return;
        }

        let mut cleared = self.clear_cells(&found.cells);
        apply_gravity(&mut self.board);

        let mut chains = 0u32;
        loop {
            let chain = find_matches(&self.board);
            if chain.is_empty() {
                break;
            }
            chains += 1;
            debug!(chain = chains, cells = chain.cells.len(), "chain reaction");
            cleared += self.clear_cells(&chain.cells);
            apply_gravity(&mut self.board);
        }

        let delta = immediate_clear_score(found.runs, chains);
        self.add_score(delta);
        self.pending_matches.clear();
        self.last_event = Some(LockEvent {
            locked: true,
            staged: false,
            cells_cleared: cleared,
            runs: found.runs,
            chains,
            score_delta: delta,
        });
        self.spawn_piece();
    }

    /// Clear the staged matches, let balls fall, and look for a chain.
    ///
    /// If the fall creates new matches they replace the staged set and the call
    /// returns without spawning, so the caller can highlight them and commit
    /// again. Once nothing more matches, the clear is scored and the next piece
    /// spawns. With nothing staged this is a no-op.
    pub fn commit_staged_clear(&mut self) -> Result<GameSnapshot, SessionError> {
        self.ensure_healthy()?;
        if self.pending_matches.is_empty() {
            return Ok(self.snapshot());
        }

        let mut stage = self.stage.take().unwrap_or(StagedClear {
            staged_cells: self.pending_matches.len() as u32,
            ..StagedClear::default()
        });

        let staged = std::mem::take(&mut self.pending_matches);
        stage.cleared += self.clear_cells(&staged);
        apply_gravity(&mut self.board);

        let chain = find_matches(&self.board);
        if !chain.is_empty() {
            stage.chains += 1;
            debug!(chain = stage.chains, cells = chain.cells.len(), "chain reaction staged");
            self.pending_matches = chain.cells;
            self.stage = Some(stage);
            self.last_event = Some(LockEvent {
                locked: false,
                staged: true,
                cells_cleared: stage.cleared,
                runs: chain.runs,
                chains: stage.chains,
                score_delta: 0,
            });
            return Ok(self.snapshot());
        }

        let delta = committed_clear_score(stage.staged_cells, stage.chains);
        self.add_score(delta);
        self.last_event = Some(LockEvent {
            locked: false,
            staged: false,
            cells_cleared: stage.cleared,
            runs: 0,
            chains: stage.chains,
            score_delta: delta,
        });
        self.spawn_piece();
        Ok(self.snapshot())
    }

    /// Empty the given cells. Returns how many balls were removed.
    fn clear_cells(&mut self, cells: &BTreeSet<CellPos>) -> u32 {
        cells
            .iter()
            .filter(|&&(row, col)| self.board.clear_cell(col as i8, row as i8))
            .count() as u32
    }

    fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
        self.level = calculate_level(self.score);
        if delta > 0 {
            info!(delta, score = self.score, level = self.level, "score");
        }
    }

    /// Spawn a new piece from the preview and draw a fresh preview.
    ///
    /// Returns false (and ends the game) if the spawn cells are blocked.
    fn spawn_piece(&mut self) -> bool {
        let colors = match self.next_colors.take() {
            Some(colors) => colors,
            None => self.colors.draw(),
        };
        let piece = Piece::new(colors);
        self.next_colors = Some(self.colors.draw());
        self.piece_id = self.piece_id.wrapping_add(1);

        let blocked = !fits(&self.board, &piece);
        self.current = Some(piece);
        if blocked {
            self.game_over = true;
            info!(score = self.score, pieces = self.piece_id, "game over: spawn blocked");
            return false;
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_current(&mut self, piece: Piece) {
        self.current = Some(piece);
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(1)
    }
}
