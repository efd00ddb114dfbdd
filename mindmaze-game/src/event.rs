//! Observable engine events and the sink they are delivered to.
//!
//! Presentation (sound, animation, HUD) subscribes through an [`EventSink`] instead of the
//! engine calling into any audio or visual layer directly.
use serde::{Deserialize, Serialize};

use crate::grid::Position;

/// Why a move did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    OutOfBounds,
    Wall,
    /// The step was not one of the four unit moves.
    InvalidDirection,
    /// A move was attempted while the engine was not accepting input.
    NotPlaying,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MazeEvent {
    LevelStarted {
        level: u32,
        cols: usize,
        rows: usize,
    },
    MoveBlocked {
        at: Position,
        reason: BlockReason,
    },
    Moved {
        from: Position,
        to: Position,
    },
    ChallengeRequested {
        target: Position,
        epoch: u64,
    },
    ChallengeReady {
        target: Position,
    },
    ChallengeResolved {
        target: Position,
        correct: bool,
        score: u32,
    },
    Won {
        level: u32,
        score: u32,
    },
}

/// Receiver for engine notifications.
pub trait EventSink {
    fn notify(&mut self, event: &MazeEvent);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&mut self, _event: &MazeEvent) {}
}

/// Sink that records every event in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<MazeEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[MazeEvent] {
        &self.events
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&mut self) -> Vec<MazeEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn count_blocked(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, MazeEvent::MoveBlocked { .. }))
            .count()
    }
}

impl EventSink for EventLog {
    fn notify(&mut self, event: &MazeEvent) {
        self.events.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn notify(&mut self, event: &MazeEvent) {
        (**self).notify(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_and_drains() {
        let mut log = EventLog::new();
        log.notify(&MazeEvent::MoveBlocked {
            at: Position::new(0, 0),
            reason: BlockReason::Wall,
        });
        log.notify(&MazeEvent::Won { level: 1, score: 0 });
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.count_blocked(), 1);
        assert_eq!(log.drain().len(), 2);
        assert!(log.events().is_empty());
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = MazeEvent::Moved {
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "moved");
        let restored: MazeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(restored, event);
    }
}
