//! In-memory RunStore implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use play_core::{Run, RunId};

use crate::store::{Result, RunStore, StoreError};

/// In-memory run rows keyed by id.
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<RunId, Run>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.runs
            .read()
            .map(|runs| runs.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn put(&self, run: &Run) -> Result<()> {
        let mut runs = self.runs.write().map_err(|_| StoreError::LockPoisoned)?;
        runs.insert(run.id.clone(), run.clone());
        Ok(())
    }

    async fn find(&self, id: &RunId) -> Result<Option<Run>> {
        let runs = self.runs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(runs.get(id).cloned())
    }
}
