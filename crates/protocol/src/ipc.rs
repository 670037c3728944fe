//! Operation/Event protocol between a front end and the workflow engine.
//!
//! - `Op`: commands sent to the engine
//! - `Event`: state changes the engine reports after each successful save
//!
//! Both use tagged serialization:
//! ```json
//! { "type": "skipMarketResearch", "payload": { "process_id": "process_1" } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::document_models::{DocumentDraft, DocumentType};
use crate::process_models::ProcessStatus;
use crate::step_models::{StepId, StepLocation, StepStatus};

/// Outcome a human records at a gate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum HumanDecision {
    Approve,
    Revise,
}

/// Operations accepted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Create a new process and open clarification round 1.
    CreateProcess {
        name: String,
        requirement: String,
        version_id: String,
        project_id: String,
    },

    /// Answer the open clarification round. Keys are question ids.
    SubmitClarification {
        process_id: String,
        responses: BTreeMap<String, String>,
        answered_by: Option<String>,
    },

    /// Resolve the `1.2_judgment` branch.
    JudgeMarketResearch { process_id: String },

    RunMarketResearch { process_id: String },

    SkipMarketResearch { process_id: String },

    /// Dispatch the current step to its owning agent.
    RunAgentStep { process_id: String },

    /// Record an externally produced output for the current step.
    CompleteStep {
        process_id: String,
        step_id: StepId,
        output: String,
        documents: Vec<DocumentDraft>,
    },

    /// Record a human decision at the current gate.
    RecordHumanDecision {
        process_id: String,
        decision: HumanDecision,
        notes: Option<String>,
    },

    /// Raw status update; never moves the current step pointer.
    UpdateStep {
        process_id: String,
        step_id: StepId,
        status: StepStatus,
        output: Option<String>,
    },

    GetProcess { process_id: String },

    ListProcesses,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    ProcessCreated {
        process_id: String,
        name: String,
    },

    StepStatusUpdate {
        process_id: String,
        step_id: StepId,
        status: StepStatus,
    },

    CurrentStepChanged {
        process_id: String,
        #[ts(type = "string")]
        current_step: StepLocation,
    },

    DocumentCreated {
        process_id: String,
        step_id: StepId,
        document_id: String,
        doc_type: DocumentType,
        version: String,
    },

    ClarificationRoundOpened {
        process_id: String,
        round_number: u32,
        question_count: usize,
    },

    ClarificationRoundClosed {
        process_id: String,
        round_number: u32,
        all_answered: bool,
    },

    ProcessStatusUpdate {
        process_id: String,
        status: ProcessStatus,
        progress: u8,
    },

    ProcessCompleted {
        process_id: String,
    },
}

impl Event {
    pub fn process_id(&self) -> &str {
        match self {
            Event::ProcessCreated { process_id, .. }
            | Event::StepStatusUpdate { process_id, .. }
            | Event::CurrentStepChanged { process_id, .. }
            | Event::DocumentCreated { process_id, .. }
            | Event::ClarificationRoundOpened { process_id, .. }
            | Event::ClarificationRoundClosed { process_id, .. }
            | Event::ProcessStatusUpdate { process_id, .. }
            | Event::ProcessCompleted { process_id } => process_id,
        }
    }
}
