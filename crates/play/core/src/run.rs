//! Run aggregates: compiled steps and the playthrough lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{BlockId, PlanId, PlanVersionId, RunId};
use crate::plan::BlockType;

/// Composite step identifier: owning block plus sub-index within it.
///
/// A block expands into one step per game instruction, so the block id alone
/// is not unique across steps.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId {
    pub block_id: BlockId,
    pub sub_index: u32,
}

impl StepId {
    pub fn new(block_id: BlockId, sub_index: u32) -> Self {
        Self {
            block_id,
            sub_index,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.block_id, self.sub_index)
    }
}

/// One atomic unit of play within a run.
///
/// Steps are generated by the compiler and live embedded in their [`Run`];
/// they are never persisted independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    pub id: StepId,
    /// Global 0-based ordinal across the whole run; strictly contiguous.
    pub index: u32,
    pub block_id: BlockId,
    pub block_type: BlockType,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    /// Shared context attached only to the first step of a block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    /// Authored block notes, attached only to the first step of a block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Title of the snapshotted game this step came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_title: Option<String>,
}

/// Where a run's content came from, and whether it survived persistence.
///
/// The virtual-run fallback is an explicit variant rather than an exception
/// side path so callers can branch on it deliberately, e.g. to warn the
/// participant that progress will not be saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOrigin {
    /// Compiled from a frozen published version.
    Published {
        version_id: PlanVersionId,
        version_number: u32,
        /// False when persistence was unavailable and the run is virtual.
        persisted: bool,
    },
    /// Compiled from the plan's mutable draft blocks; never persisted.
    Draft,
}

impl RunOrigin {
    pub fn is_persisted(&self) -> bool {
        matches!(self, RunOrigin::Published { persisted: true, .. })
    }
}

/// Lifecycle status of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::InProgress)
    }
}

/// Errors raised by run lifecycle transitions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RunTransitionError {
    #[error("run is already terminal ({status:?})")]
    AlreadyTerminal { status: RunStatus },

    #[error("step index {index} out of range for {step_count} steps")]
    StepOutOfRange { index: u32, step_count: usize },
}

/// One playthrough instance, owned by the participant who started it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub plan_id: PlanId,
    pub origin: RunOrigin,
    pub name: String,
    pub status: RunStatus,
    pub steps: Vec<RunStep>,
    pub block_count: u32,
    pub total_duration_minutes: u32,
    pub current_step_index: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Assemble a fresh in-progress run from compiled steps.
    ///
    /// The total duration is the version's declared total when present,
    /// otherwise the sum of step durations.
    pub fn assemble(
        id: RunId,
        plan_id: PlanId,
        origin: RunOrigin,
        name: String,
        steps: Vec<RunStep>,
        block_count: u32,
        declared_total_minutes: Option<u32>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let total_duration_minutes = declared_total_minutes
            .unwrap_or_else(|| steps.iter().map(|step| step.duration_minutes).sum());

        Self {
            id,
            plan_id,
            origin,
            name,
            status: RunStatus::InProgress,
            steps,
            block_count,
            total_duration_minutes,
            current_step_index: 0,
            started_at,
            completed_at: None,
        }
    }

    /// Move the play cursor to `index`.
    pub fn advance_to(&mut self, index: u32) -> Result<(), RunTransitionError> {
        if self.status.is_terminal() {
            return Err(RunTransitionError::AlreadyTerminal {
                status: self.status,
            });
        }
        if index as usize >= self.steps.len() {
            return Err(RunTransitionError::StepOutOfRange {
                index,
                step_count: self.steps.len(),
            });
        }
        self.current_step_index = index;
        Ok(())
    }

    /// Finish the run successfully.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), RunTransitionError> {
        self.finish(RunStatus::Completed, at)
    }

    /// Give up on the run.
    pub fn abandon(&mut self, at: DateTime<Utc>) -> Result<(), RunTransitionError> {
        self.finish(RunStatus::Abandoned, at)
    }

    fn finish(&mut self, status: RunStatus, at: DateTime<Utc>) -> Result<(), RunTransitionError> {
        if self.status.is_terminal() {
            return Err(RunTransitionError::AlreadyTerminal {
                status: self.status,
            });
        }
        self.status = status;
        self.completed_at = Some(at);
        Ok(())
    }
}
