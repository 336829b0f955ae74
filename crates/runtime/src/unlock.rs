//! Keypad unlock engine: serialized attempts over a versioned state store.
//!
//! Many participants race to submit codes for the same (session, artifact)
//! pair. The engine never read-modify-writes application state in place: it
//! evaluates the pure transition from `play-core` against the latest stored
//! version and commits with compare-and-store, reloading on conflict. Two
//! racers near the attempt limit therefore linearize: one write commits,
//! the other re-evaluates against the committed state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use play_core::{
    ArtifactId, ArtifactState, AttemptOutcome, KeypadConfig, SessionId, VariantId,
};

use crate::api::{
    AttemptStatus, KeypadAttemptResponse, KeypadStateResponse, KeypadStateView, Result,
    RuntimeError,
};
use crate::events::{EventBus, SessionEvent};
use crate::identity::Participant;
use crate::reveal::RevealGate;
use crate::store::{ArtifactDirectory, ArtifactStateStore, CasOutcome};

/// A session-bound artifact confirmed to be a keypad.
struct ResolvedKeypad {
    title: String,
    config: KeypadConfig,
}

/// Per-session keypad state machine driver.
pub struct UnlockEngine {
    directory: Arc<dyn ArtifactDirectory>,
    states: Arc<dyn ArtifactStateStore>,
    reveal: RevealGate,
    bus: EventBus,
    max_retries: u32,
}

impl UnlockEngine {
    pub fn new(
        directory: Arc<dyn ArtifactDirectory>,
        states: Arc<dyn ArtifactStateStore>,
        reveal: RevealGate,
        bus: EventBus,
        max_retries: u32,
    ) -> Self {
        Self {
            directory,
            states,
            reveal,
            bus,
            max_retries,
        }
    }

    /// Evaluate one code submission for `participant`.
    ///
    /// Exactly one broadcast event is emitted for every counted-or-locked
    /// outcome; `already_unlocked` short-circuits silently. The configured
    /// code never appears in the response or in any event.
    pub async fn attempt(
        &self,
        session: &SessionId,
        artifact_id: &ArtifactId,
        entered_code: &str,
        participant: &Participant,
    ) -> Result<KeypadAttemptResponse> {
        if entered_code.trim().is_empty() {
            return Err(RuntimeError::Validation(
                "entered code must not be empty".to_owned(),
            ));
        }

        let keypad = self.resolve_keypad(session, artifact_id).await?;
        let now = Utc::now();

        let (state, outcome) = self
            .commit_attempt(session, artifact_id, &keypad.config, entered_code, participant, now)
            .await?;

        // Reveal runs for the unlocking call, and again (as a no-op thanks
        // to the unique reveal key) when a duplicate success arrives late.
        let newly_revealed = match outcome {
            AttemptOutcome::Unlocked | AttemptOutcome::AlreadyUnlocked => {
                self.reveal.reveal_public(session, artifact_id, now).await?
            }
            _ => Vec::new(),
        };

        self.broadcast(
            session,
            artifact_id,
            &outcome,
            &state,
            participant,
            newly_revealed.len(),
            now,
        );

        Ok(build_response(&keypad.config, &state, outcome, newly_revealed))
    }

    /// Read path: non-secret keypad description plus current state.
    pub async fn state(
        &self,
        session: &SessionId,
        artifact_id: &ArtifactId,
    ) -> Result<KeypadStateResponse> {
        let keypad = self.resolve_keypad(session, artifact_id).await?;
        let state = self
            .states
            .load(session, artifact_id)
            .await?
            .map(|versioned| versioned.state)
            .unwrap_or_default();

        Ok(KeypadStateResponse {
            artifact_id: artifact_id.clone(),
            title: keypad.title,
            code_length: keypad.config.code_length,
            max_attempts: keypad.config.max_attempts,
            attempts_left: keypad.config.attempts_left(state.attempt_count),
            success_message: keypad.config.success_message.clone(),
            fail_message: keypad.config.fail_message.clone(),
            locked_message: keypad.config.locked_message.clone(),
            keypad_state: KeypadStateView::from(&state),
        })
    }

    async fn resolve_keypad(
        &self,
        session: &SessionId,
        artifact_id: &ArtifactId,
    ) -> Result<ResolvedKeypad> {
        let artifact = self
            .directory
            .find_for_session(session, artifact_id)
            .await?
            .ok_or_else(|| RuntimeError::not_found("artifact", artifact_id))?;

        match artifact.kind.as_keypad() {
            Some(config) => Ok(ResolvedKeypad {
                title: artifact.title.clone(),
                config: config.clone(),
            }),
            None => Err(RuntimeError::Validation(format!(
                "artifact {artifact_id} is not an unlockable keypad"
            ))),
        }
    }

    /// Load, evaluate, compare-and-store, retrying on version conflicts.
    ///
    /// Outcomes that do not mutate state return without writing, so probing
    /// an unlocked or locked keypad costs no store write and cannot bump the
    /// count. Retry exhaustion surfaces as a server error the participant
    /// can safely resubmit: the attempt counts only once its write commits.
    async fn commit_attempt(
        &self,
        session: &SessionId,
        artifact_id: &ArtifactId,
        config: &KeypadConfig,
        entered_code: &str,
        participant: &Participant,
        now: DateTime<Utc>,
    ) -> Result<(ArtifactState, AttemptOutcome)> {
        for _ in 0..self.max_retries {
            let loaded = self.states.load(session, artifact_id).await?;
            let (mut state, expected) = match loaded {
                Some(versioned) => (versioned.state, Some(versioned.version)),
                None => (ArtifactState::default(), None),
            };

            let outcome = state.apply_attempt(config, entered_code, &participant.id, now);
            if !outcome.mutated_state() {
                return Ok((state, outcome));
            }

            match self
                .states
                .compare_and_store(session, artifact_id, expected, &state)
                .await?
            {
                CasOutcome::Committed => return Ok((state, outcome)),
                CasOutcome::Conflict => {
                    tracing::debug!(
                        %session,
                        artifact = %artifact_id,
                        "artifact state write conflict, reloading"
                    );
                }
            }
        }

        Err(RuntimeError::Contention {
            retries: self.max_retries,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn broadcast(
        &self,
        session: &SessionId,
        artifact_id: &ArtifactId,
        outcome: &AttemptOutcome,
        state: &ArtifactState,
        participant: &Participant,
        revealed_count: usize,
        at: DateTime<Utc>,
    ) {
        let event = match outcome {
            AttemptOutcome::Unlocked => SessionEvent::KeypadUnlocked {
                artifact_id: artifact_id.clone(),
                unlocked_by: participant.clone(),
                revealed_count,
                at,
            },
            AttemptOutcome::Failed { attempts_left } => SessionEvent::KeypadAttemptFailed {
                artifact_id: artifact_id.clone(),
                attempted_by: participant.clone(),
                attempt_count: state.attempt_count,
                attempts_left: *attempts_left,
                at,
            },
            AttemptOutcome::LockedOut | AttemptOutcome::AlreadyLockedOut => {
                SessionEvent::KeypadLockedOut {
                    artifact_id: artifact_id.clone(),
                    attempted_by: participant.clone(),
                    attempt_count: state.attempt_count,
                    at,
                }
            }
            AttemptOutcome::AlreadyUnlocked => return,
        };
        self.bus.publish(session, event);
    }
}

fn build_response(
    config: &KeypadConfig,
    state: &ArtifactState,
    outcome: AttemptOutcome,
    newly_revealed: Vec<VariantId>,
) -> KeypadAttemptResponse {
    let status = match &outcome {
        AttemptOutcome::Unlocked => AttemptStatus::Success,
        AttemptOutcome::AlreadyUnlocked => AttemptStatus::AlreadyUnlocked,
        AttemptOutcome::Failed { .. } => AttemptStatus::Fail,
        AttemptOutcome::LockedOut | AttemptOutcome::AlreadyLockedOut => AttemptStatus::Locked,
    };

    let message = match status {
        AttemptStatus::Success | AttemptStatus::AlreadyUnlocked => config.success_message.clone(),
        AttemptStatus::Fail => config.fail_message.clone(),
        AttemptStatus::Locked => config.locked_message.clone(),
    };

    let attempts_left = match &outcome {
        AttemptOutcome::Failed { attempts_left } => *attempts_left,
        _ => None,
    };

    let reveal_variant_ids = match (&outcome, newly_revealed.is_empty()) {
        (AttemptOutcome::Unlocked, _) => Some(newly_revealed),
        // A duplicate success that healed a missed reveal still reports it.
        (AttemptOutcome::AlreadyUnlocked, false) => Some(newly_revealed),
        _ => None,
    };

    KeypadAttemptResponse {
        status,
        message,
        attempts_left,
        reveal_variant_ids,
        keypad_state: KeypadStateView::from(state),
    }
}
