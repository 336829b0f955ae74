//! Gated artifacts: keypad configuration and the attempt state machine.
//!
//! [`ArtifactState::apply_attempt`] is the single transition the unlock
//! engine evaluates. It is pure (the caller supplies the clock), so an
//! optimistic retry loop can re-evaluate it against a freshly loaded state
//! after a write conflict without double-counting anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ArtifactId, ParticipantId, VariantId};

/// Secret keypad configuration.
///
/// Deliberately does not derive `Serialize`: the correct code must never
/// reach a response or broadcast payload, and keeping the type out of serde
/// makes that a compile error instead of a review item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeypadConfig {
    pub correct_code: String,
    pub code_length: u32,
    /// `None` means unlimited attempts.
    pub max_attempts: Option<u32>,
    /// Whether exhausting `max_attempts` locks the keypad out.
    pub lock_on_fail: bool,
    pub success_message: String,
    pub fail_message: String,
    pub locked_message: String,
}

impl KeypadConfig {
    pub fn new(correct_code: impl Into<String>, max_attempts: Option<u32>, lock_on_fail: bool) -> Self {
        let correct_code = correct_code.into();
        Self {
            code_length: correct_code.chars().count() as u32,
            max_attempts,
            lock_on_fail,
            success_message: "The lock clicks open!".to_owned(),
            fail_message: "Wrong code. Try again.".to_owned(),
            locked_message: "The keypad is locked.".to_owned(),
            correct_code,
        }
    }

    pub fn with_messages(
        mut self,
        success: impl Into<String>,
        fail: impl Into<String>,
        locked: impl Into<String>,
    ) -> Self {
        self.success_message = success.into();
        self.fail_message = fail.into();
        self.locked_message = locked.into();
        self
    }

    /// Remaining attempts given a current count; `None` when unlimited.
    pub fn attempts_left(&self, attempt_count: u32) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(attempt_count))
    }
}

/// Artifact kinds the runtime understands.
///
/// A closed set validated once at the directory boundary; new gated kinds
/// extend this enum rather than re-parsing loose metadata at each read site.
#[derive(Clone, Debug, PartialEq)]
pub enum ArtifactKind {
    /// Attempt-gated keypad lock.
    Keypad(KeypadConfig),
    /// Plain content with no unlock mechanic.
    Static,
}

impl ArtifactKind {
    pub fn as_keypad(&self) -> Option<&KeypadConfig> {
        match self {
            ArtifactKind::Keypad(config) => Some(config),
            ArtifactKind::Static => None,
        }
    }
}

/// An interactive content object attached to a game.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub title: String,
    pub kind: ArtifactKind,
}

/// Visibility of variant content dependent on an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantVisibility {
    Public,
    RoleRestricted,
}

/// Content revealed when its parent artifact unlocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactVariant {
    pub id: VariantId,
    pub artifact_id: ArtifactId,
    pub title: String,
    pub visibility: VariantVisibility,
}

/// Per-(session, artifact) unlock progress.
///
/// Created lazily on the first attempt; lives for the session. Both
/// `is_unlocked` and `is_locked_out` are one-way transitions, and once
/// unlocked the attempt count never changes again.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactState {
    pub attempt_count: u32,
    pub is_unlocked: bool,
    pub is_locked_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_by: Option<ParticipantId>,
}

/// Result of evaluating one submission against the keypad state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// This submission matched the code and unlocked the artifact.
    Unlocked,
    /// The artifact was unlocked before this submission; nothing changed and
    /// the submission was not counted.
    AlreadyUnlocked,
    /// Wrong code; the attempt was counted.
    Failed { attempts_left: Option<u32> },
    /// Wrong code, and this submission exhausted the allowance.
    LockedOut,
    /// The artifact was locked out before this submission; nothing changed.
    AlreadyLockedOut,
}

impl AttemptOutcome {
    /// Whether the transition mutated state and must be written back.
    pub fn mutated_state(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::Unlocked | AttemptOutcome::Failed { .. } | AttemptOutcome::LockedOut
        )
    }
}

impl ArtifactState {
    /// Evaluate one code submission.
    ///
    /// Terminal states short-circuit without counting the attempt, so
    /// probing after success or lockout can neither inflate the count nor
    /// leak whether a late code would have matched.
    pub fn apply_attempt(
        &mut self,
        config: &KeypadConfig,
        entered_code: &str,
        participant: &ParticipantId,
        at: DateTime<Utc>,
    ) -> AttemptOutcome {
        if self.is_unlocked {
            return AttemptOutcome::AlreadyUnlocked;
        }
        if self.is_locked_out {
            return AttemptOutcome::AlreadyLockedOut;
        }

        self.attempt_count += 1;

        if entered_code == config.correct_code {
            self.is_unlocked = true;
            self.unlocked_at = Some(at);
            self.unlocked_by = Some(participant.clone());
            return AttemptOutcome::Unlocked;
        }

        if config.lock_on_fail
            && let Some(max) = config.max_attempts
            && self.attempt_count >= max
        {
            self.is_locked_out = true;
            return AttemptOutcome::LockedOut;
        }

        AttemptOutcome::Failed {
            attempts_left: config.attempts_left(self.attempt_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant() -> ParticipantId {
        ParticipantId::new("p1")
    }

    fn keypad(max_attempts: Option<u32>) -> KeypadConfig {
        KeypadConfig::new("4242", max_attempts, true)
    }

    #[test]
    fn correct_code_unlocks_and_records_who() {
        let config = keypad(Some(3));
        let mut state = ArtifactState::default();
        let at = Utc::now();

        let outcome = state.apply_attempt(&config, "4242", &participant(), at);
        assert_eq!(outcome, AttemptOutcome::Unlocked);
        assert!(state.is_unlocked);
        assert_eq!(state.attempt_count, 1);
        assert_eq!(state.unlocked_at, Some(at));
        assert_eq!(state.unlocked_by, Some(participant()));
    }

    #[test]
    fn lockout_boundary_is_fail_fail_locked() {
        let config = keypad(Some(3));
        let mut state = ArtifactState::default();
        let now = Utc::now();

        assert_eq!(
            state.apply_attempt(&config, "0000", &participant(), now),
            AttemptOutcome::Failed {
                attempts_left: Some(2)
            }
        );
        assert_eq!(
            state.apply_attempt(&config, "1111", &participant(), now),
            AttemptOutcome::Failed {
                attempts_left: Some(1)
            }
        );
        assert_eq!(
            state.apply_attempt(&config, "2222", &participant(), now),
            AttemptOutcome::LockedOut
        );
        assert!(state.is_locked_out);
        assert_eq!(state.attempt_count, 3);

        // A fourth submission is a no-op, even with the correct code.
        assert_eq!(
            state.apply_attempt(&config, "4242", &participant(), now),
            AttemptOutcome::AlreadyLockedOut
        );
        assert_eq!(state.attempt_count, 3);
        assert!(!state.is_unlocked);
    }

    #[test]
    fn unlock_is_monotone() {
        let config = keypad(Some(3));
        let mut state = ArtifactState::default();
        let now = Utc::now();

        state.apply_attempt(&config, "4242", &participant(), now);
        let frozen = state.clone();

        for code in ["0000", "4242", "9999"] {
            let outcome = state.apply_attempt(&config, code, &ParticipantId::new("p2"), now);
            assert_eq!(outcome, AttemptOutcome::AlreadyUnlocked);
            assert!(!outcome.mutated_state());
        }
        assert_eq!(state, frozen);
    }

    #[test]
    fn unlimited_attempts_never_lock_out() {
        let config = keypad(None);
        let mut state = ArtifactState::default();
        let now = Utc::now();

        for _ in 0..10 {
            assert_eq!(
                state.apply_attempt(&config, "0000", &participant(), now),
                AttemptOutcome::Failed {
                    attempts_left: None
                }
            );
        }
        assert!(!state.is_locked_out);
        assert_eq!(state.attempt_count, 10);
    }

    #[test]
    fn exhausted_allowance_without_lock_on_fail_keeps_failing() {
        let config = KeypadConfig::new("4242", Some(2), false);
        let mut state = ArtifactState::default();
        let now = Utc::now();

        state.apply_attempt(&config, "0000", &participant(), now);
        state.apply_attempt(&config, "0000", &participant(), now);
        let outcome = state.apply_attempt(&config, "0000", &participant(), now);
        assert_eq!(
            outcome,
            AttemptOutcome::Failed {
                attempts_left: Some(0)
            }
        );
        assert!(!state.is_locked_out);

        // The code still works; the allowance is advisory without lockout.
        assert_eq!(
            state.apply_attempt(&config, "4242", &participant(), now),
            AttemptOutcome::Unlocked
        );
    }

    #[test]
    fn code_length_derived_from_code() {
        assert_eq!(keypad(None).code_length, 4);
    }
}
