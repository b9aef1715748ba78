// SPDX-License-Identifier: MIT
//! Engine event stream.
//!
//! The UI layer observes the engine through a broadcast channel rather than
//! callbacks: each applied transition and each settled validation publishes
//! a typed event with the snapshot it produced. Lagging or absent
//! subscribers never block the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::state::GenerationSnapshot;
use crate::validation::ValidationOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEventKind {
    PhaseChanged {
        from: String,
        to: String,
    },
    ValidationSettled {
        exists: Option<bool>,
        forced: bool,
    },
    GenerationFinished {
        enhanced: bool,
        cached: bool,
        elapsed_ms: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EngineEventKind,
    pub snapshot: GenerationSnapshot,
}

/// Broadcasts engine events to all observers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Publish an event. No subscribers is fine — the send error is ignored.
    pub fn publish(&self, kind: EngineEventKind, snapshot: GenerationSnapshot) {
        let _ = self.tx.send(EngineEvent {
            at: Utc::now(),
            kind,
            snapshot,
        });
    }

    pub fn phase_changed(&self, from: &str, to: &str, snapshot: GenerationSnapshot) {
        self.publish(
            EngineEventKind::PhaseChanged {
                from: from.to_string(),
                to: to.to_string(),
            },
            snapshot,
        );
    }

    pub fn validation_settled(&self, outcome: &ValidationOutcome, snapshot: GenerationSnapshot) {
        self.publish(
            EngineEventKind::ValidationSettled {
                exists: outcome.exists,
                forced: outcome.forced,
            },
            snapshot,
        );
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.phase_changed("idle", "typing", GenerationSnapshot::initial());
    }

    #[tokio::test]
    async fn subscribers_receive_typed_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(
            EngineEventKind::GenerationFinished {
                enhanced: true,
                cached: false,
                elapsed_ms: 42,
            },
            GenerationSnapshot::initial(),
        );

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.kind,
            EngineEventKind::GenerationFinished { elapsed_ms: 42, .. }
        ));
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = EngineEvent {
            at: Utc::now(),
            kind: EngineEventKind::PhaseChanged {
                from: "idle".into(),
                to: "typing".into(),
            },
            snapshot: GenerationSnapshot::initial(),
        };
        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["type"], "phase_changed");
        assert_eq!(wire["to"], "typing");
        assert_eq!(wire["snapshot"]["phase"], "idle");
    }
}
