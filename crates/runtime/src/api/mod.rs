//! Public runtime API surface.
//!
//! This module gathers the request/response DTOs and the unified error
//! taxonomy exposed to consumers of the runtime crate, so transport adapters
//! can stay focused on serialization and routing.

pub mod errors;
pub mod types;

pub use errors::{ErrorBody, ErrorCode, ErrorEnvelope, Result, RuntimeError};
pub use types::{
    AttemptStatus, KeypadAttemptRequest, KeypadAttemptResponse, KeypadStateResponse,
    KeypadStateView, StartRunRequest, StartRunResponse,
};
