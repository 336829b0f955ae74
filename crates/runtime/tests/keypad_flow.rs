//! Keypad integration: attempt flow, lockout, reveal, broadcast, and the
//! concurrent-unlock race.

use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;

use play_core::{
    Artifact, ArtifactId, ArtifactKind, ArtifactVariant, KeypadConfig, SessionId, VariantId,
    VariantVisibility,
};
use runtime::{
    AttemptStatus, ErrorCode, InMemoryArtifactDirectory, InMemoryArtifactStateStore,
    InMemoryPlanStore, InMemoryRevealStore, InMemoryRunStore, InMemoryVariantStore,
    KeypadAttemptRequest, KeypadAttemptResponse, Participant, Runtime, SessionEvent,
    StaticIdentityProvider,
};

const CODE: &str = "839271";
const SESSION: &str = "session-1";
const ARTIFACT: &str = "artifact-lock";
const CREDENTIAL: &str = "token-alex";

struct Harness {
    runtime: Arc<Runtime>,
}

fn harness(max_attempts: Option<u32>) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let directory = Arc::new(InMemoryArtifactDirectory::new());
    directory.bind(
        SessionId::new(SESSION),
        Artifact {
            id: ArtifactId::new(ARTIFACT),
            title: "Treasure chest".into(),
            kind: ArtifactKind::Keypad(KeypadConfig::new(CODE, max_attempts, true).with_messages(
                "The chest creaks open!",
                "That code does not fit.",
                "The chest seals itself shut.",
            )),
        },
    );
    directory.bind(
        SessionId::new(SESSION),
        Artifact {
            id: ArtifactId::new("artifact-poster"),
            title: "Poster".into(),
            kind: ArtifactKind::Static,
        },
    );

    let variants = Arc::new(InMemoryVariantStore::new());
    for (id, visibility) in [
        ("v-map", VariantVisibility::Public),
        ("v-letter", VariantVisibility::Public),
        ("v-answer-key", VariantVisibility::RoleRestricted),
    ] {
        variants.add(ArtifactVariant {
            id: VariantId::new(id),
            artifact_id: ArtifactId::new(ARTIFACT),
            title: id.into(),
            visibility,
        });
    }

    let identity = Arc::new(StaticIdentityProvider::new());
    identity.grant(CREDENTIAL, Participant::new("p-alex", "Alex"));
    identity.grant("token-billie", Participant::new("p-billie", "Billie"));

    let runtime = Runtime::builder()
        .plan_store(Arc::new(InMemoryPlanStore::new()))
        .run_store(Arc::new(InMemoryRunStore::new()))
        .artifact_directory(directory)
        .artifact_state_store(Arc::new(InMemoryArtifactStateStore::new()))
        .variant_store(variants)
        .reveal_store(Arc::new(InMemoryRevealStore::new()))
        .identity_provider(identity)
        .build()
        .expect("runtime should build");

    Harness {
        runtime: Arc::new(runtime),
    }
}

fn session() -> SessionId {
    SessionId::new(SESSION)
}

fn artifact() -> ArtifactId {
    ArtifactId::new(ARTIFACT)
}

async fn attempt(runtime: &Runtime, code: &str, credential: &str) -> KeypadAttemptResponse {
    runtime
        .attempt_unlock(
            &session(),
            &artifact(),
            KeypadAttemptRequest {
                entered_code: code.into(),
            },
            credential,
        )
        .await
        .expect("attempt should not error")
}

#[tokio::test]
async fn wrong_then_right_code_reveals_public_variants() {
    let h = harness(Some(3));
    let mut events = h.runtime.subscribe(&session());

    let fail = attempt(&h.runtime, "000000", CREDENTIAL).await;
    assert_eq!(fail.status, AttemptStatus::Fail);
    assert_eq!(fail.attempts_left, Some(2));
    assert_eq!(fail.message, "That code does not fit.");
    assert_eq!(fail.keypad_state.attempt_count, 1);
    assert!(fail.reveal_variant_ids.is_none());

    let success = attempt(&h.runtime, CODE, CREDENTIAL).await;
    assert_eq!(success.status, AttemptStatus::Success);
    assert_eq!(success.message, "The chest creaks open!");
    assert_eq!(
        success.reveal_variant_ids,
        Some(vec![VariantId::new("v-map"), VariantId::new("v-letter")])
    );
    assert!(success.keypad_state.is_unlocked);
    assert_eq!(success.keypad_state.attempt_count, 2);
    assert!(success.keypad_state.unlocked_at.is_some());

    // Broadcasts arrive in submission order with non-secret metadata.
    match events.recv().await.unwrap() {
        SessionEvent::KeypadAttemptFailed {
            attempt_count,
            attempts_left,
            attempted_by,
            ..
        } => {
            assert_eq!(attempt_count, 1);
            assert_eq!(attempts_left, Some(2));
            assert_eq!(attempted_by.display_name, "Alex");
        }
        other => panic!("expected failed event, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        SessionEvent::KeypadUnlocked {
            revealed_count,
            unlocked_by,
            ..
        } => {
            assert_eq!(revealed_count, 2);
            assert_eq!(unlocked_by.display_name, "Alex");
        }
        other => panic!("expected unlocked event, got {other:?}"),
    }
}

#[tokio::test]
async fn repeat_submission_after_unlock_is_a_no_op() {
    let h = harness(Some(3));
    attempt(&h.runtime, CODE, CREDENTIAL).await;

    let mut events = h.runtime.subscribe(&session());
    let again = attempt(&h.runtime, CODE, "token-billie").await;

    assert_eq!(again.status, AttemptStatus::AlreadyUnlocked);
    assert_eq!(again.keypad_state.attempt_count, 1);
    assert!(again.reveal_variant_ids.is_none());
    // No event for an uncounted submission.
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // State still credits the original unlocker.
    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();
    assert!(state.keypad_state.is_unlocked);
    assert_eq!(state.keypad_state.attempt_count, 1);
}

#[tokio::test]
async fn three_wrong_codes_lock_the_keypad() {
    let h = harness(Some(3));

    assert_eq!(
        attempt(&h.runtime, "000001", CREDENTIAL).await.status,
        AttemptStatus::Fail
    );
    assert_eq!(
        attempt(&h.runtime, "000002", CREDENTIAL).await.status,
        AttemptStatus::Fail
    );

    let locked = attempt(&h.runtime, "000003", CREDENTIAL).await;
    assert_eq!(locked.status, AttemptStatus::Locked);
    assert_eq!(locked.message, "The chest seals itself shut.");
    assert!(locked.keypad_state.is_locked_out);
    assert_eq!(locked.keypad_state.attempt_count, 3);

    // A fourth submission, even with the right code, stays locked and does
    // not move the count.
    let frozen = attempt(&h.runtime, CODE, CREDENTIAL).await;
    assert_eq!(frozen.status, AttemptStatus::Locked);
    assert_eq!(frozen.keypad_state.attempt_count, 3);
    assert!(!frozen.keypad_state.is_unlocked);

    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();
    assert_eq!(state.attempts_left, Some(0));
    assert!(state.keypad_state.is_locked_out);
}

#[tokio::test]
async fn unlimited_keypad_omits_attempts_left() {
    let h = harness(None);

    let fail = attempt(&h.runtime, "000000", CREDENTIAL).await;
    assert_eq!(fail.status, AttemptStatus::Fail);
    assert_eq!(fail.attempts_left, None);

    let json = serde_json::to_value(&fail).unwrap();
    assert!(json.get("attempts_left").is_none());

    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();
    assert_eq!(state.max_attempts, None);
    assert_eq!(state.attempts_left, None);
}

#[tokio::test]
async fn concurrent_correct_codes_unlock_exactly_once() {
    let h = harness(Some(1));
    let mut events = h.runtime.subscribe(&session());

    let first = {
        let runtime = h.runtime.clone();
        tokio::spawn(async move { attempt(&runtime, CODE, CREDENTIAL).await })
    };
    let second = {
        let runtime = h.runtime.clone();
        tokio::spawn(async move { attempt(&runtime, CODE, "token-billie").await })
    };

    let (a, b) = (first.await.unwrap(), second.await.unwrap());
    let mut statuses = [a.status, b.status];
    statuses.sort_by_key(|status| format!("{status:?}"));
    assert_eq!(
        statuses,
        [AttemptStatus::AlreadyUnlocked, AttemptStatus::Success]
    );

    // One counted attempt, one unlock event, one reveal.
    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();
    assert_eq!(state.keypad_state.attempt_count, 1);
    assert!(state.keypad_state.is_unlocked);

    // Each variant is revealed by exactly one of the two calls, never both.
    let revealed_a = a.reveal_variant_ids.clone().unwrap_or_default();
    let revealed_b = b.reveal_variant_ids.clone().unwrap_or_default();
    assert!(revealed_a.iter().all(|id| !revealed_b.contains(id)));
    let mut union: Vec<_> = revealed_a.into_iter().chain(revealed_b).collect();
    union.sort_unstable();
    assert_eq!(union, vec![VariantId::new("v-letter"), VariantId::new("v-map")]);

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::KeypadUnlocked { .. }
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn payloads_never_contain_the_code() {
    let h = harness(Some(3));
    let mut events = h.runtime.subscribe(&session());

    let fail = attempt(&h.runtime, "000000", CREDENTIAL).await;
    let success = attempt(&h.runtime, CODE, CREDENTIAL).await;
    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();

    for payload in [
        serde_json::to_string(&fail).unwrap(),
        serde_json::to_string(&success).unwrap(),
        serde_json::to_string(&state).unwrap(),
    ] {
        assert!(!payload.contains(CODE), "code leaked in {payload}");
    }

    while let Ok(event) = events.try_recv() {
        let payload = serde_json::to_string(&event).unwrap();
        assert!(!payload.contains(CODE), "code leaked in event {payload}");
    }
}

#[tokio::test]
async fn non_keypad_artifact_is_rejected_without_state() {
    let h = harness(Some(3));

    let err = h
        .runtime
        .attempt_unlock(
            &session(),
            &ArtifactId::new("artifact-poster"),
            KeypadAttemptRequest {
                entered_code: "1234".into(),
            },
            CREDENTIAL,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[tokio::test]
async fn unknown_artifact_or_session_is_not_found() {
    let h = harness(Some(3));

    let err = h
        .runtime
        .attempt_unlock(
            &SessionId::new("other-session"),
            &artifact(),
            KeypadAttemptRequest {
                entered_code: "1234".into(),
            },
            CREDENTIAL,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn empty_code_fails_validation_without_counting() {
    let h = harness(Some(3));

    let err = h
        .runtime
        .attempt_unlock(
            &session(),
            &artifact(),
            KeypadAttemptRequest {
                entered_code: "  ".into(),
            },
            CREDENTIAL,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let state = h
        .runtime
        .keypad_state(&session(), &artifact())
        .await
        .unwrap();
    assert_eq!(state.keypad_state.attempt_count, 0);
}

#[tokio::test]
async fn role_restricted_variants_stay_hidden() {
    let h = harness(Some(3));

    let success = attempt(&h.runtime, CODE, CREDENTIAL).await;
    let revealed = success.reveal_variant_ids.unwrap();
    assert!(!revealed.contains(&VariantId::new("v-answer-key")));
    assert_eq!(revealed.len(), 2);
}
