//! Mutable session state and the handlers that change it.
//!
//! Everything in here runs with the engine's session lock held and never
//! suspends, so a guard tick can not interleave with a player step.

use log::{debug, error, info};

use super::events::{EventSink, GameEvent, GameProgress, Outcome};
use super::timer::{PeriodicTimer, TickCallback};
use crate::board::{Board, Direction};
use crate::errors::GameError;

pub(crate) struct Session {
    pub(crate) board: Option<Board>,
    pub(crate) collected: u32,
    pub(crate) elapsed: u64,
    pub(crate) outcome: Option<Outcome>,
    /// Set by start, cleared by stop and game over.
    pub(crate) ticking: bool,
    /// Bumped on every start and stop. Tick callbacks carry the value current
    /// when they were handed out and are ignored once it has moved on, so a
    /// tick that was waiting on the lock across a stop/start pair is dropped.
    pub(crate) generation: u64,
    pub(crate) guard_timer: Box<dyn PeriodicTimer>,
    pub(crate) clock_timer: Box<dyn PeriodicTimer>,
}

impl Session {
    pub(crate) fn new(
        board: Option<Board>,
        guard_timer: Box<dyn PeriodicTimer>,
        clock_timer: Box<dyn PeriodicTimer>,
    ) -> Self {
        Session {
            board,
            collected: 0,
            elapsed: 0,
            outcome: None,
            ticking: false,
            generation: 0,
            guard_timer,
            clock_timer,
        }
    }

    fn progress(&self, won: bool) -> GameProgress {
        GameProgress {
            won,
            score: self.collected,
            elapsed: self.elapsed,
        }
    }

    fn advanced(&self, events: &EventSink) {
        events.emit(GameEvent::Advanced(self.progress(false)));
    }

    pub(crate) fn step(&mut self, direction: Direction, events: &EventSink) -> Result<(), GameError> {
        if self.outcome.is_some() {
            return Ok(());
        }
        let board = self
            .board
            .as_mut()
            .ok_or_else(|| GameError::OperationalState("no board loaded".to_string()))?;

        let mv = board.move_player(direction);
        let goal = board.basket_goal();
        let caught = board.any_guard_caught_player();
        debug!("player {} {} -> {}", direction, mv.from, mv.to);

        if mv.collected {
            self.collected += 1;
            events.emit(GameEvent::BasketCollected);
        }
        events.field_changed(mv.from);
        events.field_changed(mv.to);

        if self.collected >= goal {
            self.finish(Outcome::Won, events);
        } else if caught {
            self.finish(Outcome::Lost, events);
        } else {
            self.advanced(events);
        }
        Ok(())
    }

    pub(crate) fn guard_tick(&mut self, events: &EventSink) {
        if self.outcome.is_some() || !self.ticking {
            return;
        }
        let count = self.board.as_ref().map_or(0, Board::guard_count);

        // Every guard moves once the tick has started, even after a catch.
        for index in 0..count {
            let Some(board) = self.board.as_mut() else {
                return;
            };
            let mv = match board.move_guard(index) {
                Ok(mv) => mv,
                Err(e) => {
                    error!("guard tick aborted: {}", e);
                    break;
                }
            };
            let caught = board.guard_caught_player(mv.to);
            events.field_changed(mv.from);
            events.field_changed(mv.to);
            if caught && self.outcome.is_none() {
                self.finish(Outcome::Lost, events);
            }
        }

        if self.outcome.is_none() {
            self.advanced(events);
        }
    }

    pub(crate) fn clock_tick(&mut self, events: &EventSink) {
        if self.outcome.is_some() || !self.ticking {
            return;
        }
        self.elapsed += 1;
        self.advanced(events);
    }

    fn finish(&mut self, outcome: Outcome, events: &EventSink) {
        self.stop_timers();
        self.outcome = Some(outcome);
        let progress = self.progress(outcome == Outcome::Won);
        info!(
            "Game over: {:?} with {} baskets after {}s",
            outcome, progress.score, progress.elapsed
        );
        events.emit(GameEvent::GameOver(progress));
    }

    pub(crate) fn reset(&mut self) {
        self.stop_timers();
        self.outcome = None;
        self.elapsed = 0;
        self.collected = 0;
    }

    /// Whether a callback handed out at `generation` may still act.
    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.ticking && self.generation == generation
    }

    /// Start both timers with callbacks built for the next generation.
    /// No-op while already ticking, so live callbacks stay valid.
    pub(crate) fn start_timers<F>(&mut self, make_callback: F)
    where
        F: Fn(u64, fn(&mut Session, &EventSink)) -> TickCallback,
    {
        if self.ticking {
            return;
        }
        self.generation += 1;
        self.ticking = true;
        self.guard_timer
            .start(make_callback(self.generation, Session::guard_tick));
        self.clock_timer
            .start(make_callback(self.generation, Session::clock_tick));
    }

    pub(crate) fn stop_timers(&mut self) {
        if self.ticking {
            self.generation += 1;
        }
        self.ticking = false;
        self.guard_timer.stop();
        self.clock_timer.stop();
    }
}
