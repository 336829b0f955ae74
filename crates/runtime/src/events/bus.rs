//! Session-scoped broadcast bus.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use play_core::SessionId;

use super::types::SessionEvent;

/// Fan-out bus with one broadcast channel per live session.
///
/// Publishing is best-effort: the state mutation that triggered an event is
/// the source of truth, and a dropped notification must never fail or roll
/// back the attempt that produced it. Delivery is at-most-once with no
/// redelivery.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<SessionId, broadcast::Sender<SessionEvent>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a bus with default per-session capacity.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish an event to a session's channel.
    ///
    /// Sessions without a channel or without live subscribers drop the event;
    /// both are normal between client connects.
    pub fn publish(&self, session: &SessionId, event: SessionEvent) {
        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        match channels.get(session) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    tracing::trace!(%session, "no live subscribers for session, event dropped");
                }
            }
            None => {
                tracing::trace!(%session, "no channel for session, event dropped");
            }
        }
    }

    /// Subscribe to a session's channel, creating it on first use.
    pub fn subscribe(&self, session: &SessionId) -> broadcast::Receiver<SessionEvent> {
        let mut channels = self.channels.write().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(session.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            capacity: self.capacity,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use play_core::ArtifactId;

    use crate::identity::Participant;

    fn event() -> SessionEvent {
        SessionEvent::KeypadLockedOut {
            artifact_id: ArtifactId::new("a1"),
            attempted_by: Participant::new("p1", "Alex"),
            attempt_count: 3,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        // Must not panic or error; the event is simply dropped.
        bus.publish(&SessionId::new("s1"), event());
    }

    #[tokio::test]
    async fn subscribers_receive_session_events() {
        let bus = EventBus::new();
        let session = SessionId::new("s1");
        let mut rx = bus.subscribe(&session);

        bus.publish(&session, event());
        let received = rx.recv().await.unwrap();
        assert_eq!(received.artifact_id(), &ArtifactId::new("a1"));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let bus = EventBus::new();
        let mut other = bus.subscribe(&SessionId::new("s2"));

        bus.publish(&SessionId::new("s1"), event());
        assert!(matches!(
            other.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
