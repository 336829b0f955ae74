//! High-level runtime façade.
//!
//! The runtime wires the run lifecycle, the unlock engine, and the session
//! event bus over injected store collaborators, and exposes a builder-based
//! API for transports to drive live play.

use std::sync::Arc;

use tokio::sync::broadcast;

use play_core::{ArtifactId, PlanId, SessionId};

use crate::api::{
    KeypadAttemptRequest, KeypadAttemptResponse, KeypadStateResponse, Result, RuntimeError,
    StartRunRequest, StartRunResponse,
};
use crate::events::{EventBus, SessionEvent};
use crate::identity::{IdentityProvider, Participant};
use crate::reveal::RevealGate;
use crate::run::RunService;
use crate::store::{
    ArtifactDirectory, ArtifactStateStore, PlanStore, RevealStore, RunStore, VariantStore,
};
use crate::unlock::UnlockEngine;

/// Runtime configuration shared across the services.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Broadcast buffer per session channel.
    pub event_capacity: usize,
    /// Upper bound on compare-and-store retries per attempt.
    pub cas_max_retries: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_capacity: 100,
            cas_max_retries: 16,
        }
    }
}

/// Main entry point for live play sessions.
///
/// Construct with [`Runtime::builder`], injecting every collaborator; the
/// in-memory stores from [`crate::store::memory`] satisfy all of them for
/// tests and local runs.
pub struct Runtime {
    identity: Arc<dyn IdentityProvider>,
    runs: RunService,
    unlock: UnlockEngine,
    bus: EventBus,
}

impl Runtime {
    /// Create a new runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Start a run of the requested plan for the authenticated participant.
    pub async fn start_run(
        &self,
        request: StartRunRequest,
        credential: &str,
    ) -> Result<StartRunResponse> {
        let participant = self.authenticate(credential).await?;

        if request.plan_id.trim().is_empty() {
            return Err(RuntimeError::InvalidId(
                "plan id must not be empty".to_owned(),
            ));
        }

        let run = self
            .runs
            .start(&PlanId::new(request.plan_id), &participant)
            .await?;
        Ok(StartRunResponse { run })
    }

    /// Submit a keypad code on behalf of the authenticated participant.
    pub async fn attempt_unlock(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
        request: KeypadAttemptRequest,
        credential: &str,
    ) -> Result<KeypadAttemptResponse> {
        let participant = self.authenticate(credential).await?;
        self.unlock
            .attempt(session, artifact, &request.entered_code, &participant)
            .await
    }

    /// Read the non-secret keypad state.
    pub async fn keypad_state(
        &self,
        session: &SessionId,
        artifact: &ArtifactId,
    ) -> Result<KeypadStateResponse> {
        self.unlock.state(session, artifact).await
    }

    /// Subscribe to a session's broadcast channel.
    pub fn subscribe(&self, session: &SessionId) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe(session)
    }

    /// Run lifecycle service, for play-progression callers.
    pub fn runs(&self) -> &RunService {
        &self.runs
    }

    async fn authenticate(&self, credential: &str) -> Result<Participant> {
        self.identity
            .resolve(credential)
            .await?
            .ok_or(RuntimeError::Unauthorized)
    }
}

/// Builder for [`Runtime`] with explicit collaborator injection.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    plans: Option<Arc<dyn PlanStore>>,
    runs: Option<Arc<dyn RunStore>>,
    directory: Option<Arc<dyn ArtifactDirectory>>,
    states: Option<Arc<dyn ArtifactStateStore>>,
    variants: Option<Arc<dyn VariantStore>>,
    reveals: Option<Arc<dyn RevealStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            plans: None,
            runs: None,
            directory: None,
            states: None,
            variants: None,
            reveals: None,
            identity: None,
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn plan_store(mut self, store: Arc<dyn PlanStore>) -> Self {
        self.plans = Some(store);
        self
    }

    pub fn run_store(mut self, store: Arc<dyn RunStore>) -> Self {
        self.runs = Some(store);
        self
    }

    pub fn artifact_directory(mut self, directory: Arc<dyn ArtifactDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn artifact_state_store(mut self, store: Arc<dyn ArtifactStateStore>) -> Self {
        self.states = Some(store);
        self
    }

    pub fn variant_store(mut self, store: Arc<dyn VariantStore>) -> Self {
        self.variants = Some(store);
        self
    }

    pub fn reveal_store(mut self, store: Arc<dyn RevealStore>) -> Self {
        self.reveals = Some(store);
        self
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Build the runtime, failing fast on any missing collaborator.
    pub fn build(self) -> Result<Runtime> {
        let plans = self
            .plans
            .ok_or(RuntimeError::MissingCollaborator("plan store"))?;
        let runs = self
            .runs
            .ok_or(RuntimeError::MissingCollaborator("run store"))?;
        let directory = self
            .directory
            .ok_or(RuntimeError::MissingCollaborator("artifact directory"))?;
        let states = self
            .states
            .ok_or(RuntimeError::MissingCollaborator("artifact state store"))?;
        let variants = self
            .variants
            .ok_or(RuntimeError::MissingCollaborator("variant store"))?;
        let reveals = self
            .reveals
            .ok_or(RuntimeError::MissingCollaborator("reveal store"))?;
        let identity = self
            .identity
            .ok_or(RuntimeError::MissingCollaborator("identity provider"))?;

        let bus = EventBus::with_capacity(self.config.event_capacity);
        let reveal_gate = RevealGate::new(variants, reveals);

        Ok(Runtime {
            identity,
            runs: RunService::new(plans, runs),
            unlock: UnlockEngine::new(
                directory,
                states,
                reveal_gate,
                bus.clone(),
                self.config.cas_max_retries,
            ),
            bus,
        })
    }
}
