//! Restartable periodic tick sources.
//!
//! The engine owns two of these (guard movement and the game clock) and only
//! sees the [`PeriodicTimer`] trait. [`TokioTimer`] is the real scheduler;
//! [`ManualTimer`] fires only when told to, for tests and hosts that drive
//! ticks from their own loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::errors::GameError;

pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

pub trait PeriodicTimer: Send {
    fn interval(&self) -> Duration;

    /// Takes effect the next time the timer is started.
    fn set_interval(&mut self, interval: Duration);

    fn is_running(&self) -> bool;

    /// Begin calling `on_tick` every interval. No-op if already running.
    fn start(&mut self, on_tick: TickCallback);

    /// Stop ticking. No-op if already stopped.
    fn stop(&mut self);
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timer backed by a spawned tokio task.
pub struct TokioTimer {
    runtime: Handle,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new(runtime: Handle, interval: Duration) -> Self {
        Self {
            runtime,
            interval: interval.max(MIN_INTERVAL),
            task: None,
        }
    }

    /// Timer on the runtime the caller is running in.
    pub fn current(interval: Duration) -> Result<Self, GameError> {
        let runtime = Handle::try_current()
            .map_err(|e| GameError::OperationalState(format!("no tokio runtime: {e}")))?;
        Ok(Self::new(runtime, interval))
    }
}

impl PeriodicTimer for TokioTimer {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn start(&mut self, on_tick: TickCallback) {
        if self.is_running() {
            return;
        }
        let period = self.interval;
        self.task = Some(self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                on_tick();
            }
        }));
        debug!("timer started ({}ms)", period.as_millis());
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            // The callback is synchronous, so cancellation lands between ticks.
            task.abort();
            debug!("timer stopped");
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ManualState {
    interval: Duration,
    running: bool,
    on_tick: Option<TickCallback>,
    fired: u64,
}

fn lock(state: &Mutex<ManualState>) -> MutexGuard<'_, ManualState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timer that ticks only when [`ManualTimerHandle::fire`] is called.
pub struct ManualTimer {
    state: Arc<Mutex<ManualState>>,
}

/// Remote control for a [`ManualTimer`] that has been handed to an engine.
#[derive(Clone)]
pub struct ManualTimerHandle {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTimer {
    pub fn new(interval: Duration) -> (ManualTimer, ManualTimerHandle) {
        let state = Arc::new(Mutex::new(ManualState {
            interval,
            running: false,
            on_tick: None,
            fired: 0,
        }));
        (
            ManualTimer {
                state: state.clone(),
            },
            ManualTimerHandle { state },
        )
    }
}

impl PeriodicTimer for ManualTimer {
    fn interval(&self) -> Duration {
        lock(&self.state).interval
    }

    fn set_interval(&mut self, interval: Duration) {
        lock(&self.state).interval = interval;
    }

    fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    fn start(&mut self, on_tick: TickCallback) {
        let mut state = lock(&self.state);
        if !state.running {
            state.running = true;
            state.on_tick = Some(on_tick);
        }
    }

    fn stop(&mut self) {
        let mut state = lock(&self.state);
        state.running = false;
        state.on_tick = None;
    }
}

impl ManualTimerHandle {
    /// Deliver one tick. Returns false when the timer is stopped.
    pub fn fire(&self) -> bool {
        // Release our lock before the callback: it may stop this very timer.
        let on_tick = {
            let mut state = lock(&self.state);
            if !state.running {
                return false;
            }
            state.fired += 1;
            state.on_tick.clone()
        };
        if let Some(cb) = on_tick {
            cb();
        }
        true
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    /// Ticks delivered so far.
    pub fn fired(&self) -> u64 {
        lock(&self.state).fired
    }
}
