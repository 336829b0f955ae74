//! Request and response shapes consumed by transport adapters.
//!
//! The HTTP layer itself lives outside this crate; these types define the
//! JSON wire contract it serializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use play_core::{ArtifactId, ArtifactState, Run, VariantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunRequest {
    pub plan_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunResponse {
    pub run: Run,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypadAttemptRequest {
    pub entered_code: String,
}

/// Participant-visible outcome of a keypad submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Fail,
    Locked,
    AlreadyUnlocked,
}

/// Non-secret keypad state shared with every participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypadStateView {
    pub is_unlocked: bool,
    pub is_locked_out: bool,
    pub attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl From<&ArtifactState> for KeypadStateView {
    fn from(state: &ArtifactState) -> Self {
        Self {
            is_unlocked: state.is_unlocked,
            is_locked_out: state.is_locked_out,
            attempt_count: state.attempt_count,
            unlocked_at: state.unlocked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypadAttemptResponse {
    pub status: AttemptStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<u32>,
    /// Variants newly revealed by this call; already-revealed variants are
    /// excluded even though they stay revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_variant_ids: Option<Vec<VariantId>>,
    pub keypad_state: KeypadStateView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypadStateResponse {
    pub artifact_id: ArtifactId,
    pub title: String,
    pub code_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<u32>,
    pub success_message: String,
    pub fail_message: String,
    pub locked_message: String,
    pub keypad_state: KeypadStateView,
}
