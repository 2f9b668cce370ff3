//! # Engine Module - Game Session Orchestration
//!
//! [`GameEngine`] owns one board plus the session counters, and drives them
//! from two periodic tick sources:
//!
//! - guard movement (every 300-600ms)
//! - the game clock (one elapsed second per tick)
//!
//! Player steps, guard ticks and clock ticks all go through one session lock,
//! so they never interleave. Observers get [`GameEvent`]s on the receiver
//! returned by the constructor and drain it on their own task.
//!
//! ```rust
//! use std::time::Duration;
//! use parkchase::board::{Board, Direction, Item};
//! use parkchase::engine::{GameEngine, GameEvent, ManualTimer};
//!
//! let mut board = Board::new(4, 1).unwrap();
//! board.set_piece(Item::basket(0, 1)).unwrap();
//! let (guards, _) = ManualTimer::new(Duration::from_millis(500));
//! let (clock, _) = ManualTimer::new(Duration::from_secs(1));
//! let (engine, mut events) =
//!     GameEngine::with_board(board, Box::new(guards), Box::new(clock)).unwrap();
//!
//! engine.step(Direction::Right).unwrap();
//! assert!(engine.is_game_over());
//! assert_eq!(events.try_recv().unwrap(), GameEvent::BasketCollected);
//! ```
//!
//! Load and reset are expected to run with the timers stopped; use
//! [`GameEngine::new_game`] to do the whole stop, load, reset, start sequence.

pub mod events;
mod session;
pub mod timer;

pub use events::{EventReceiver, EventSink, GameEvent, GameProgress, Outcome};
pub use timer::{ManualTimer, ManualTimerHandle, PeriodicTimer, TickCallback, TokioTimer};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::board::{Board, Direction, Guard, Piece, Position};
use crate::config::EngineConfig;
use crate::errors::GameError;
use crate::storage::{BoardStore, TextFileStore};
use session::Session;

type TickHandler = fn(&mut Session, &EventSink);

pub struct GameEngine {
    session: Arc<Mutex<Session>>,
    events: EventSink,
    store: Option<Arc<dyn BoardStore>>,
}

impl GameEngine {
    /// Store-backed engine with no board yet; call [`load`](Self::load) or
    /// [`new_game`](Self::new_game) before stepping.
    pub fn new(
        store: Arc<dyn BoardStore>,
        guard_timer: Box<dyn PeriodicTimer>,
        clock_timer: Box<dyn PeriodicTimer>,
    ) -> (Self, EventReceiver) {
        let (engine, rx) = Self::build(None, guard_timer, clock_timer);
        (engine.with_store(store), rx)
    }

    /// Engine around an already-built board, without persistence.
    ///
    /// The board's player cell must still hold the player.
    pub fn with_board(
        board: Board,
        guard_timer: Box<dyn PeriodicTimer>,
        clock_timer: Box<dyn PeriodicTimer>,
    ) -> Result<(Self, EventReceiver), GameError> {
        if !board.player_placed() {
            return Err(GameError::InvalidArgument(format!(
                "player cell {} is occupied by another piece",
                board.player().position
            )));
        }
        Ok(Self::build(Some(board), guard_timer, clock_timer))
    }

    pub fn with_store(mut self, store: Arc<dyn BoardStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Text-file store and tokio timers. Must be called inside a runtime.
    pub fn from_config(config: &EngineConfig) -> Result<(Self, EventReceiver), GameError> {
        let guards = TokioTimer::current(config.guard_interval())?;
        let clock = TokioTimer::current(config.clock_interval())?;
        Ok(Self::new(
            Arc::new(TextFileStore),
            Box::new(guards),
            Box::new(clock),
        ))
    }

    fn build(
        board: Option<Board>,
        guard_timer: Box<dyn PeriodicTimer>,
        clock_timer: Box<dyn PeriodicTimer>,
    ) -> (Self, EventReceiver) {
        let (events, rx) = EventSink::channel();
        let session = Session::new(board, guard_timer, clock_timer);
        (
            GameEngine {
                session: Arc::new(Mutex::new(session)),
                events,
                store: None,
            },
            rx,
        )
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, action: &str) -> Result<Arc<dyn BoardStore>, GameError> {
        self.store
            .clone()
            .ok_or_else(|| GameError::OperationalState(format!("no board store to {action} with")))
    }

    /// Callbacks hold only a weak reference so a running timer never keeps a
    /// dropped engine alive. They act only while `generation` is current.
    fn tick_callback(&self, generation: u64, handler: TickHandler) -> TickCallback {
        let session = Arc::downgrade(&self.session);
        let events = self.events.clone();
        Arc::new(move || {
            if let Some(session) = session.upgrade() {
                let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
                if session.accepts(generation) {
                    handler(&mut session, &events);
                }
            }
        })
    }

    /// Replace the board with one read from `path` and zero the collected count.
    ///
    /// On failure the current board is left as it was.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let store = self.store("load")?;
        let path: PathBuf = path.as_ref().to_path_buf();
        let board = tokio::task::spawn_blocking(move || store.load(&path))
            .await
            .map_err(|e| GameError::Internal(format!("load task failed: {e}")))??;

        let mut session = self.lock();
        debug!("board replaced:\n{}", board.render());
        session.board = Some(board);
        session.collected = 0;
        Ok(())
    }

    /// Write the current board, recording the baskets collected so far.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let store = self.store("save")?;
        let (board, collected) = {
            let session = self.lock();
            let board = session
                .board
                .clone()
                .ok_or_else(|| GameError::OperationalState("no board to save".to_string()))?;
            (board, session.collected)
        };
        let path: PathBuf = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || store.save(&path, &board, collected))
            .await
            .map_err(|e| GameError::Internal(format!("save task failed: {e}")))??;
        Ok(())
    }

    /// Stop, load `path`, reset counters and start ticking again.
    ///
    /// If the load fails the old board is kept and the timers are restarted
    /// if they were running before.
    pub async fn new_game(&self, path: impl AsRef<Path>) -> Result<(), GameError> {
        let was_running = self.is_running();
        self.stop_timers();
        if let Err(e) = self.load(path.as_ref()).await {
            if was_running {
                self.start_timers();
            }
            return Err(e);
        }
        self.reset();
        self.start_timers();
        info!("New game from {}", path.as_ref().display());
        Ok(())
    }

    pub fn step(&self, direction: Direction) -> Result<(), GameError> {
        self.lock().step(direction, &self.events)
    }

    /// Parse a direction token and step. Unknown tokens change nothing.
    pub fn step_command(&self, token: &str) -> Result<(), GameError> {
        let direction: Direction = token.parse().map_err(|e| {
            warn!("Rejected move {:?}", token);
            e
        })?;
        self.step(direction)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Start both tick sources. Does nothing once the game is over.
    pub fn start_timers(&self) {
        let mut session = self.lock();
        if session.outcome.is_some() {
            debug!("game is over, timers not started");
            return;
        }
        session.start_timers(|generation, handler| self.tick_callback(generation, handler));
    }

    /// Stop both tick sources. Once this returns no tick changes the session.
    pub fn stop_timers(&self) {
        self.lock().stop_timers();
    }

    pub fn pause(&self) {
        self.stop_timers();
        info!("Paused");
    }

    pub fn resume(&self) {
        self.start_timers();
        info!("Resumed");
    }

    /// 0 when no board is loaded.
    pub fn board_size(&self) -> usize {
        self.lock().board.as_ref().map_or(0, Board::size)
    }

    pub fn basket_goal(&self) -> u32 {
        self.lock().board.as_ref().map_or(0, Board::basket_goal)
    }

    pub fn collected_baskets(&self) -> u32 {
        self.lock().collected
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.lock().elapsed
    }

    pub fn is_game_over(&self) -> bool {
        self.lock().outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.lock().outcome
    }

    /// Whether the tick sources are currently running.
    pub fn is_running(&self) -> bool {
        self.lock().ticking
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Option<Piece> {
        self.lock()
            .board
            .as_ref()
            .and_then(|b| b.piece_at(Position::new(row, col)))
    }

    pub fn player_position(&self) -> Option<Position> {
        self.lock().board.as_ref().map(|b| b.player().position)
    }

    pub fn guards(&self) -> Vec<Guard> {
        self.lock()
            .board
            .as_ref()
            .map(Board::guards)
            .unwrap_or_default()
    }

    pub fn board_snapshot(&self) -> Option<Board> {
        self.lock().board.clone()
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        self.lock().stop_timers();
    }
}
