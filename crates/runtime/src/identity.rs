//! Participant identity resolution.
//!
//! The platform's auth layer turns a request credential into an opaque
//! participant identity plus a display name for broadcast payloads. The
//! runtime only sees this contract; tests use [`StaticIdentityProvider`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use play_core::ParticipantId;

use crate::store::Result;

/// A resolved participant: opaque id plus display identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.into(),
        }
    }
}

/// Resolves an opaque credential to a participant.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` when the credential is missing, expired, or unknown.
    async fn resolve(&self, credential: &str) -> Result<Option<Participant>>;
}

/// Fixed credential table for tests and local runs.
pub struct StaticIdentityProvider {
    participants: RwLock<HashMap<String, Participant>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self {
            participants: RwLock::new(HashMap::new()),
        }
    }

    pub fn grant(&self, credential: impl Into<String>, participant: Participant) {
        let mut participants = self
            .participants
            .write()
            .unwrap_or_else(|e| e.into_inner());
        participants.insert(credential.into(), participant);
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, credential: &str) -> Result<Option<Participant>> {
        let participants = self
            .participants
            .read()
            .map_err(|_| crate::store::StoreError::LockPoisoned)?;
        Ok(participants.get(credential).cloned())
    }
}
