//! Test utilities & fixtures.
//! Engines wired to manual timers, and board files written into temp dirs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parkchase::board::Board;
use parkchase::engine::{EventReceiver, GameEngine, GameEvent, ManualTimer, ManualTimerHandle};
use parkchase::storage::TextFileStore;

/// Engine plus the remote controls for both of its timers.
pub struct Harness {
    pub engine: GameEngine,
    pub events: EventReceiver,
    pub guards: ManualTimerHandle,
    pub clock: ManualTimerHandle,
}

impl Harness {
    /// Everything emitted since the last drain.
    #[allow(dead_code)]
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }
}

fn timers() -> (ManualTimer, ManualTimerHandle, ManualTimer, ManualTimerHandle) {
    let (g, gh) = ManualTimer::new(Duration::from_millis(500));
    let (c, ch) = ManualTimer::new(Duration::from_secs(1));
    (g, gh, c, ch)
}

/// In-memory engine, no store.
#[allow(dead_code)]
pub fn harness(board: Board) -> Harness {
    let (g, guards, c, clock) = timers();
    let (engine, events) = GameEngine::with_board(board, Box::new(g), Box::new(c)).unwrap();
    Harness {
        engine,
        events,
        guards,
        clock,
    }
}

/// File-backed engine with no board loaded yet.
#[allow(dead_code)]
pub fn stored_harness() -> Harness {
    let (g, guards, c, clock) = timers();
    let (engine, events) = GameEngine::new(Arc::new(TextFileStore), Box::new(g), Box::new(c));
    Harness {
        engine,
        events,
        guards,
        clock,
    }
}

/// Write `content` as `name` inside `dir` and return its path.
#[allow(dead_code)]
pub fn board_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Shipped level presets.
#[allow(dead_code)]
pub fn level_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("levels")
        .join(format!("{name}.txt"))
}
