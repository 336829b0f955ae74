//! Run lifecycle: plan resolution, compilation, persistence, fallback.

use std::sync::Arc;

use chrono::Utc;

use play_core::{
    CompileError, Plan, PlanId, PlanVersion, Run, RunId, RunOrigin, compile,
};

use crate::api::{Result, RuntimeError};
use crate::identity::Participant;
use crate::store::{PlanStore, RunStore};

/// Creates runs from plans and drives their lifecycle.
pub struct RunService {
    plans: Arc<dyn PlanStore>,
    runs: Arc<dyn RunStore>,
}

impl RunService {
    pub fn new(plans: Arc<dyn PlanStore>, runs: Arc<dyn RunStore>) -> Self {
        Self { plans, runs }
    }

    /// Start a playthrough of `plan_id` for `participant`.
    ///
    /// Prefers the plan's published version; plans that predate versioning
    /// fall back to their draft blocks and get an ephemeral run. A compile
    /// with no playable content fails validation before anything is written.
    pub async fn start(&self, plan_id: &PlanId, participant: &Participant) -> Result<Run> {
        let plan = self
            .plans
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| RuntimeError::not_found("plan", plan_id))?;

        let run = match self.plans.current_version(plan_id).await? {
            Some(version) => self.start_from_version(&plan, version).await?,
            None => self.start_from_draft(&plan)?,
        };

        tracing::info!(
            plan = %plan.id,
            run = %run.id,
            by = %participant.id,
            steps = run.steps.len(),
            "run started"
        );
        Ok(run)
    }

    async fn start_from_version(&self, plan: &Plan, version: PlanVersion) -> Result<Run> {
        let steps = compile(&version.blocks).map_err(no_playable)?;
        let name = version.name.clone().unwrap_or_else(|| plan.title.clone());

        let mut run = Run::assemble(
            RunId::new(synthetic_id("run")),
            plan.id.clone(),
            RunOrigin::Published {
                version_id: version.id.clone(),
                version_number: version.version_number,
                persisted: true,
            },
            name,
            steps,
            version.blocks.len() as u32,
            version.total_duration_minutes,
            Utc::now(),
        );

        match self.runs.put(&run).await {
            Ok(()) => Ok(run),
            Err(err) => {
                // Availability over durability at start time: hand the
                // participant a playable run instead of failing the request.
                tracing::warn!(
                    plan = %plan.id,
                    error = %err,
                    "run persistence unavailable, degrading to virtual run"
                );
                run.id = RunId::new(synthetic_id("virtual"));
                if let RunOrigin::Published { persisted, .. } = &mut run.origin {
                    *persisted = false;
                }
                Ok(run)
            }
        }
    }

    /// Compatibility path for plans that have never been published: compile
    /// the draft blocks directly. There is no version to reference, so the
    /// run is ephemeral by design and persistence is never attempted.
    fn start_from_draft(&self, plan: &Plan) -> Result<Run> {
        let steps = compile(&plan.blocks).map_err(no_playable)?;

        Ok(Run::assemble(
            RunId::new(synthetic_id("draft")),
            plan.id.clone(),
            RunOrigin::Draft,
            plan.title.clone(),
            steps,
            plan.blocks.len() as u32,
            None,
            Utc::now(),
        ))
    }

    /// Move the run's play cursor.
    pub async fn advance(&self, run: &mut Run, to_index: u32) -> Result<()> {
        run.advance_to(to_index)
            .map_err(|err| RuntimeError::Validation(err.to_string()))?;
        self.persist_if_tracked(run).await
    }

    /// Finish the run successfully.
    pub async fn complete(&self, run: &mut Run) -> Result<()> {
        run.complete(Utc::now())
            .map_err(|err| RuntimeError::Validation(err.to_string()))?;
        self.persist_if_tracked(run).await
    }

    /// Give up on the run.
    pub async fn abandon(&self, run: &mut Run) -> Result<()> {
        run.abandon(Utc::now())
            .map_err(|err| RuntimeError::Validation(err.to_string()))?;
        self.persist_if_tracked(run).await
    }

    /// Virtual and draft runs live only in the caller's hands; persisted
    /// runs propagate every lifecycle change to the store.
    async fn persist_if_tracked(&self, run: &Run) -> Result<()> {
        if run.origin.is_persisted() {
            self.runs.put(run).await?;
        }
        Ok(())
    }
}

fn no_playable(err: CompileError) -> RuntimeError {
    match err {
        CompileError::NoPlayableContent => RuntimeError::Validation(err.to_string()),
    }
}

/// Synthetic id with an origin marker prefix, for runs the store never saw
/// (and as the client-generated key for runs it did).
fn synthetic_id(prefix: &str) -> String {
    let bytes: [u8; 8] = rand::random();
    format!("{prefix}-{}", hex::encode(bytes))
}
