//! In-memory artifact directory and variant catalog.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use play_core::{Artifact, ArtifactId, ArtifactVariant, SessionId};

use crate::store::{ArtifactDirectory, Result, StoreError, VariantStore};

/// In-memory artifact bindings keyed by (session, artifact).
///
/// The real directory resolves the artifact through the session's bound
/// game; here the binding is seeded directly with
/// [`bind`](Self::bind).
pub struct InMemoryArtifactDirectory {
    bindings: RwLock<HashMap<(SessionId, ArtifactId), Artifact>>,
}

impl InMemoryArtifactDirectory {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Attach `artifact` to `session`'s game.
    pub fn bind(&self, session: SessionId, artifact: Artifact) {
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings.insert((session, artifact.id.clone()), artifact);
    }
}

impl Default for InMemoryArtifactDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactDirectory for InMemoryArtifactDirectory {
    async fn find_for_session(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
    ) -> Result<Option<Artifact>> {
        let bindings = self.bindings.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(bindings.get(&(session.clone(), artifact.clone())).cloned())
    }
}

/// In-memory variant catalog keyed by parent artifact.
pub struct InMemoryVariantStore {
    variants: RwLock<HashMap<ArtifactId, Vec<ArtifactVariant>>>,
}

impl InMemoryVariantStore {
    pub fn new() -> Self {
        Self {
            variants: RwLock::new(HashMap::new()),
        }
    }

    pub fn add(&self, variant: ArtifactVariant) {
        let mut variants = self.variants.write().unwrap_or_else(|e| e.into_inner());
        variants
            .entry(variant.artifact_id.clone())
            .or_default()
            .push(variant);
    }
}

impl Default for InMemoryVariantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VariantStore for InMemoryVariantStore {
    async fn variants_of(&self, artifact: &ArtifactId) -> Result<Vec<ArtifactVariant>> {
        let variants = self.variants.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(variants.get(artifact).cloned().unwrap_or_default())
    }
}
