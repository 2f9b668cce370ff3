//! Notifications the engine emits for whoever is presenting the game.
//!
//! Events go into an unbounded channel in the order the engine produces them.
//! The consumer drains the receiver on its own task or thread; nothing here
//! assumes where that is.

use log::trace;
use tokio::sync::mpsc;

use crate::board::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Score and clock at the moment an event was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameProgress {
    pub won: bool,
    pub score: u32,
    pub elapsed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The content of this cell may have changed; re-read it.
    FieldChanged(Position),
    /// A step or tick completed without ending the game.
    Advanced(GameProgress),
    /// Terminal. No further events until the session is reset.
    GameOver(GameProgress),
    /// The player picked up a basket.
    BasketCollected,
}

pub type EventReceiver = mpsc::UnboundedReceiver<GameEvent>;

/// Sending half held by the engine and its tick callbacks.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl EventSink {
    pub fn channel() -> (EventSink, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, rx)
    }

    pub fn emit(&self, event: GameEvent) {
        if self.tx.send(event).is_err() {
            // Receiver dropped: nobody is watching, the game carries on.
            trace!("event dropped, no observer: {:?}", event);
        }
    }

    pub fn field_changed(&self, pos: Position) {
        self.emit(GameEvent::FieldChanged(pos));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.field_changed(Position::new(1, 2));
        sink.emit(GameEvent::BasketCollected);
        assert_eq!(
            rx.try_recv().unwrap(),
            GameEvent::FieldChanged(Position::new(1, 2))
        );
        assert_eq!(rx.try_recv().unwrap(), GameEvent::BasketCollected);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emitting_without_receiver_is_harmless() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(GameEvent::BasketCollected);
    }
}
