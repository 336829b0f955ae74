//! In-memory versioned artifact state with compare-and-store semantics.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use play_core::{ArtifactId, ArtifactState, SessionId};

use crate::store::{ArtifactStateStore, CasOutcome, Result, StoreError, VersionedState};

/// In-memory cells keyed by (session, artifact), each carrying a version
/// that increments on every committed write.
///
/// The whole compare-and-store runs under one write lock, which is the
/// in-memory stand-in for the remote store's conditional update.
pub struct InMemoryArtifactStateStore {
    cells: RwLock<HashMap<(SessionId, ArtifactId), VersionedState>>,
}

impl InMemoryArtifactStateStore {
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryArtifactStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStateStore for InMemoryArtifactStateStore {
    async fn load(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
    ) -> Result<Option<VersionedState>> {
        let cells = self.cells.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(cells.get(&(session.clone(), artifact.clone())).cloned())
    }

    async fn compare_and_store(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
        expected: Option<u64>,
        state: &ArtifactState,
    ) -> Result<CasOutcome> {
        let mut cells = self.cells.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = (session.clone(), artifact.clone());

        let outcome = match (cells.get(&key), expected) {
            (None, None) => {
                cells.insert(
                    key,
                    VersionedState {
                        state: state.clone(),
                        version: 1,
                    },
                );
                CasOutcome::Committed
            }
            (Some(current), Some(version)) if current.version == version => {
                cells.insert(
                    key,
                    VersionedState {
                        state: state.clone(),
                        version: version + 1,
                    },
                );
                CasOutcome::Committed
            }
            _ => CasOutcome::Conflict,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> (SessionId, ArtifactId) {
        (SessionId::new("s1"), ArtifactId::new("a1"))
    }

    #[tokio::test]
    async fn create_then_conditional_update() {
        let store = InMemoryArtifactStateStore::new();
        let (session, artifact) = key();
        let state = ArtifactState::default();

        assert_eq!(
            store
                .compare_and_store(&session, &artifact, None, &state)
                .await
                .unwrap(),
            CasOutcome::Committed
        );

        let loaded = store.load(&session, &artifact).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);

        assert_eq!(
            store
                .compare_and_store(&session, &artifact, Some(1), &state)
                .await
                .unwrap(),
            CasOutcome::Committed
        );
        let loaded = store.load(&session, &artifact).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let store = InMemoryArtifactStateStore::new();
        let (session, artifact) = key();
        let state = ArtifactState::default();

        store
            .compare_and_store(&session, &artifact, None, &state)
            .await
            .unwrap();

        // Second create and stale-version update both lose.
        assert_eq!(
            store
                .compare_and_store(&session, &artifact, None, &state)
                .await
                .unwrap(),
            CasOutcome::Conflict
        );
        assert_eq!(
            store
                .compare_and_store(&session, &artifact, Some(7), &state)
                .await
                .unwrap(),
            CasOutcome::Conflict
        );
    }
}
