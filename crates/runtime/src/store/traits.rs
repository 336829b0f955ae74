//! Store contracts for plan content, runs, and artifact state.
//!
//! The platform's backend is a remote store; everything here is an injected
//! collaborator so the services can be exercised against the in-memory
//! implementations in [`super::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use play_core::{
    Artifact, ArtifactId, ArtifactState, ArtifactVariant, Plan, PlanId, PlanVersion, Run, RunId,
    SessionId, VariantId,
};

use super::error::Result;

/// Read access to authored plans and their published versions.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Resolve a plan visible to the caller; `None` when missing or
    /// inaccessible.
    async fn find_plan(&self, id: &PlanId) -> Result<Option<Plan>>;

    /// The plan's current published version, if it has ever been published.
    async fn current_version(&self, id: &PlanId) -> Result<Option<PlanVersion>>;
}

/// Persistence for run rows.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Upsert a run keyed by its id. Used both for creation and for
    /// progression updates.
    async fn put(&self, run: &Run) -> Result<()>;

    async fn find(&self, id: &RunId) -> Result<Option<Run>>;
}

/// Resolves artifacts within the scope of a session's bound game.
#[async_trait]
pub trait ArtifactDirectory: Send + Sync {
    /// `None` when the artifact does not exist or is not attached to the
    /// session's game.
    async fn find_for_session(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
    ) -> Result<Option<Artifact>>;
}

/// A stored artifact state together with its write version.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionedState {
    pub state: ArtifactState,
    pub version: u64,
}

/// Result of a conditional write against [`ArtifactStateStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    Committed,
    /// Another writer got there first; reload and re-evaluate.
    Conflict,
}

/// Versioned per-(session, artifact) state with compare-and-store writes.
///
/// This is the serialization point for concurrent unlock attempts: a write
/// only commits when the caller's expected version still matches, so two
/// participants racing near the attempt limit cannot both slip through.
#[async_trait]
pub trait ArtifactStateStore: Send + Sync {
    async fn load(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
    ) -> Result<Option<VersionedState>>;

    /// Write `state` if the stored version still equals `expected`
    /// (`None` = the row must not exist yet).
    async fn compare_and_store(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
        expected: Option<u64>,
        state: &ArtifactState,
    ) -> Result<CasOutcome>;
}

/// Read access to the variants dependent on an artifact.
#[async_trait]
pub trait VariantStore: Send + Sync {
    async fn variants_of(&self, artifact: &ArtifactId) -> Result<Vec<ArtifactVariant>>;
}

/// Per-session variant reveal records, unique on (session, variant).
#[async_trait]
pub trait RevealStore: Send + Sync {
    /// Create the reveal record unless it already exists. Returns `true`
    /// when this call created it; this uniqueness is what the reveal gate's
    /// idempotence is built on.
    async fn insert_if_absent(
        &self,
        session: &SessionId,
        variant: &VariantId,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// All variants revealed in this session so far.
    async fn revealed(&self, session: &SessionId) -> Result<Vec<VariantId>>;
}
