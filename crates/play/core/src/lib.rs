//! Deterministic play-session domain logic shared across the runtime and
//! tooling.
//!
//! `play-core` defines the canonical plan content model (blocks, game
//! snapshots), the step compiler that turns an authored block list into an
//! ordered run, and the keypad attempt transition evaluated by the unlock
//! engine. Everything here is pure: no I/O, no clock access, no async. The
//! `runtime` crate layers persistence, identity, and broadcast on top of
//! these types.
pub mod artifact;
pub mod compiler;
pub mod ids;
pub mod plan;
pub mod run;

pub use artifact::{
    Artifact, ArtifactKind, ArtifactState, ArtifactVariant, AttemptOutcome, KeypadConfig,
    VariantVisibility,
};
pub use compiler::{CompileError, DEFAULT_STEP_MINUTES, compile};
pub use ids::{
    ArtifactId, BlockId, ParticipantId, PlanId, PlanVersionId, RunId, SessionId, VariantId,
};
pub use plan::{Block, BlockType, GameSnapshot, Instruction, Plan, PlanVersion};
pub use run::{Run, RunOrigin, RunStatus, RunStep, RunTransitionError, StepId};
