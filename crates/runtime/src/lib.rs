//! Runtime orchestration for live play sessions.
//!
//! This crate wires plan compilation, the run lifecycle, the artifact unlock
//! engine, and session event broadcast into a cohesive API. Consumers embed
//! [`Runtime`] to start runs, drive keypad attempts, and stream session
//! events to connected participants.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the façade and builder
//! - [`api`] exposes the request/response types downstream transports use
//! - [`events`] provides the session-scoped broadcast bus
//! - [`run`], [`unlock`], and [`reveal`] implement the lifecycle services
//! - [`store`] and [`identity`] define collaborator contracts plus in-memory
//!   implementations reused by tests and local runs
pub mod api;
pub mod events;
pub mod identity;
pub mod reveal;
pub mod run;
pub mod runtime;
pub mod store;
pub mod unlock;

pub use api::{
    AttemptStatus, ErrorBody, ErrorCode, ErrorEnvelope, KeypadAttemptRequest,
    KeypadAttemptResponse, KeypadStateResponse, KeypadStateView, Result, RuntimeError,
    StartRunRequest, StartRunResponse,
};
pub use events::{EventBus, SessionEvent};
pub use identity::{IdentityProvider, Participant, StaticIdentityProvider};
pub use reveal::RevealGate;
pub use run::RunService;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use store::{
    ArtifactDirectory, ArtifactStateStore, CasOutcome, InMemoryArtifactDirectory,
    InMemoryArtifactStateStore, InMemoryPlanStore, InMemoryRevealStore, InMemoryRunStore,
    InMemoryVariantStore, PlanStore, RevealStore, RunStore, StoreError, VariantStore,
    VersionedState,
};
pub use unlock::UnlockEngine;
