//! Event types broadcast to session participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use play_core::ArtifactId;

use crate::identity::Participant;

/// Events fanned out to every participant connected to a session.
///
/// Payloads carry only non-secret metadata; the configured keypad code never
/// appears here, on any outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A keypad was unlocked; dependent public variants are now visible.
    KeypadUnlocked {
        artifact_id: ArtifactId,
        unlocked_by: Participant,
        /// How many variants this unlock newly revealed.
        revealed_count: usize,
        at: DateTime<Utc>,
    },

    /// A wrong code was submitted.
    KeypadAttemptFailed {
        artifact_id: ArtifactId,
        attempted_by: Participant,
        attempt_count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        attempts_left: Option<u32>,
        at: DateTime<Utc>,
    },

    /// The attempt allowance is exhausted; the keypad is locked.
    KeypadLockedOut {
        artifact_id: ArtifactId,
        attempted_by: Participant,
        attempt_count: u32,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn artifact_id(&self) -> &ArtifactId {
        match self {
            SessionEvent::KeypadUnlocked { artifact_id, .. }
            | SessionEvent::KeypadAttemptFailed { artifact_id, .. }
            | SessionEvent::KeypadLockedOut { artifact_id, .. } => artifact_id,
        }
    }
}
