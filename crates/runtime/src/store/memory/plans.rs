//! In-memory PlanStore implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use play_core::{Plan, PlanId, PlanVersion};

use crate::store::{PlanStore, Result, StoreError};

/// In-memory plan catalog.
///
/// Seed with [`insert_plan`](Self::insert_plan) and
/// [`publish_version`](Self::publish_version); the runtime only reads.
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<PlanId, Plan>>,
    versions: RwLock<HashMap<PlanId, PlanVersion>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
            versions: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert_plan(&self, plan: Plan) {
        let mut plans = self.plans.write().unwrap_or_else(|e| e.into_inner());
        plans.insert(plan.id.clone(), plan);
    }

    /// Make `version` the plan's current published version.
    pub fn publish_version(&self, version: PlanVersion) {
        let mut versions = self.versions.write().unwrap_or_else(|e| e.into_inner());
        versions.insert(version.plan_id.clone(), version);
    }
}

impl Default for InMemoryPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn find_plan(&self, id: &PlanId) -> Result<Option<Plan>> {
        let plans = self.plans.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(plans.get(id).cloned())
    }

    async fn current_version(&self, id: &PlanId) -> Result<Option<PlanVersion>> {
        let versions = self.versions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(versions.get(id).cloned())
    }
}
