//! The process aggregate and its steps.
//!
//! A `Process` is one running instance of the fixed twelve-step workflow for
//! a single product requirement. It is always loaded and saved as a whole.

use crate::document_models::{ClarificationRound, Document};
use crate::step_models::{StepId, StepLocation, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Aggregate status of a process.
///
/// `InProgress` from creation until the terminal step completes, then
/// `Completed`. `Pending` exists for aggregates that were persisted but never
/// started.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Pending,
    InProgress,
    Completed,
}

/// Per-step payload that only some steps carry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepExtension {
    /// Step 1.1 owns the clarification rounds.
    #[serde(rename_all = "camelCase")]
    Clarification {
        clarification_rounds: Vec<ClarificationRound>,
    },
}

/// One stage of the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub status: StepStatus,
    /// Set on the first transition into `InProgress` and never reset.
    pub started_at: Option<DateTime<Utc>>,
    /// Set if and only if `status == Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub input: Option<String>,
    /// Set if and only if `status == Completed`.
    pub output: Option<String>,
    /// Owning agent; `None` marks a human gate.
    pub agent_name: Option<String>,
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<StepExtension>,
}

impl Step {
    /// Clarification rounds, if this step carries them.
    pub fn clarification_rounds(&self) -> Option<&[ClarificationRound]> {
        match &self.extension {
            Some(StepExtension::Clarification {
                clarification_rounds,
            }) => Some(clarification_rounds),
            None => None,
        }
    }

    pub fn clarification_rounds_mut(&mut self) -> Option<&mut Vec<ClarificationRound>> {
        match &mut self.extension {
            Some(StepExtension::Clarification {
                clarification_rounds,
            }) => Some(clarification_rounds),
            None => None,
        }
    }
}

/// The aggregate root of the workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub name: String,
    pub requirement: String,
    /// Opaque foreign key, never interpreted by the engine.
    pub version_id: String,
    /// Opaque foreign key, never interpreted by the engine.
    pub project_id: String,
    pub status: ProcessStatus,
    #[ts(type = "string")]
    pub current_step: StepLocation,
    /// Always exactly the twelve fixed step identifiers.
    pub steps: BTreeMap<StepId, Step>,
    /// Flattened, append-only view of every document in every step.
    pub documents: Vec<Document>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Process {
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(&id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.get_mut(&id)
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }
}
