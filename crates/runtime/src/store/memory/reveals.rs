//! In-memory reveal records with unique (session, variant) keys.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use play_core::{SessionId, VariantId};

use crate::store::{Result, RevealStore, StoreError};

/// In-memory reveal records. The unique map key is what makes
/// `insert_if_absent` idempotent.
pub struct InMemoryRevealStore {
    reveals: RwLock<HashMap<(SessionId, VariantId), DateTime<Utc>>>,
}

impl InMemoryRevealStore {
    pub fn new() -> Self {
        Self {
            reveals: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRevealStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevealStore for InMemoryRevealStore {
    async fn insert_if_absent(
        &self,
        session: &SessionId,
        variant: &VariantId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut reveals = self.reveals.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = (session.clone(), variant.clone());
        if reveals.contains_key(&key) {
            return Ok(false);
        }
        reveals.insert(key, at);
        Ok(true)
    }

    async fn revealed(&self, session: &SessionId) -> Result<Vec<VariantId>> {
        let reveals = self.reveals.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<VariantId> = reveals
            .keys()
            .filter(|(s, _)| s == session)
            .map(|(_, variant)| variant.clone())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
