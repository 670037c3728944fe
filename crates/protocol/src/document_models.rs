//! Versioned documents and clarification rounds.
//!
//! Documents are immutable once created, apart from their `status` and the
//! answers recorded on embedded clarification questions. Asking for more
//! input always produces a new document version.

use crate::step_models::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// The closed set of artifact kinds the workflow produces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ClarificationQuestions,
    ClarificationAnalysis,
    ResearchReport,
    RequirementDocument,
    ChallengeReport,
    ChallengeResponse,
    HumanDecision,
    DivergenceReport,
    RefinedDocument,
    CheckpointRecord,
}

impl DocumentType {
    /// Short slug used in document identifiers.
    pub fn slug(self) -> &'static str {
        match self {
            DocumentType::ClarificationQuestions => "clarification",
            DocumentType::ClarificationAnalysis => "analysis",
            DocumentType::ResearchReport => "research",
            DocumentType::RequirementDocument => "prd",
            DocumentType::ChallengeReport => "challenge",
            DocumentType::ChallengeResponse => "response",
            DocumentType::HumanDecision => "decision",
            DocumentType::DivergenceReport => "divergence",
            DocumentType::RefinedDocument => "refined",
            DocumentType::CheckpointRecord => "checkpoint",
        }
    }

    /// The document kind an agent produces by default for a step.
    pub fn default_for_step(step: StepId) -> DocumentType {
        match step {
            StepId::Clarification => DocumentType::ClarificationQuestions,
            StepId::MarketResearch => DocumentType::ResearchReport,
            StepId::RequirementDesign | StepId::DesignUpdate | StepId::DocumentRevision => {
                DocumentType::RequirementDocument
            }
            StepId::DesignChallenge => DocumentType::ChallengeReport,
            StepId::ChallengeResponse => DocumentType::ChallengeResponse,
            StepId::HumanArbitration | StepId::HumanEvaluation => DocumentType::HumanDecision,
            StepId::DivergenceCheck => DocumentType::DivergenceReport,
            StepId::DocumentRefinement => DocumentType::RefinedDocument,
            StepId::MandatoryCheckpoint => DocumentType::CheckpointRecord,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    WaitingUserResponse,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Pending,
    Answered,
}

/// One clarification question, shared by a round and its question document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationQuestion {
    /// Stable category id (`q1`..`q5`), identical across rounds.
    pub id: String,
    pub category: String,
    /// The concrete prompts asked under this category.
    pub prompts: Vec<String>,
    /// Why the question is asked.
    pub purpose: String,
    pub status: QuestionStatus,
    pub answer: Option<String>,
    pub answered_by: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl ClarificationQuestion {
    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    InProgress,
    Completed,
}

/// One question/answer iteration inside step 1.1.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationRound {
    /// 1-based, strictly increasing, never reused.
    pub round_number: u32,
    pub status: RoundStatus,
    pub questions: Vec<ClarificationQuestion>,
    /// Id of the question document emitted for this round.
    pub document_id: String,
    pub user_summary: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Competitor entry inside a market research report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorProfile {
    pub name: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub market_share: String,
}

/// Kind-specific document payload. The engine only inspects the
/// clarification variants; everything else is recorded as produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentContent {
    #[serde(rename_all = "camelCase")]
    ClarificationQuestions {
        requirement: String,
        round_number: u32,
        questions: Vec<ClarificationQuestion>,
    },
    #[serde(rename_all = "camelCase")]
    ClarificationAnalysis {
        original_requirement: String,
        /// Category name -> answer text.
        answers_by_category: BTreeMap<String, String>,
        needs_market_research: bool,
    },
    #[serde(rename_all = "camelCase")]
    ResearchReport {
        summary: String,
        competitors: Vec<CompetitorProfile>,
        recommendations: Vec<String>,
    },
    Text {
        body: String,
    },
    Structured {
        #[ts(type = "unknown")]
        value: serde_json::Value,
    },
}

/// A versioned, typed artifact attached to a step and to the process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Owning step.
    pub step_id: StepId,
    /// Distinguishing version string, derived from creation time.
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub content: DocumentContent,
    pub status: DocumentStatus,
}

/// A document produced outside the engine (by an agent or a human) before it
/// has been assigned an id and version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub content: DocumentContent,
}

impl DocumentDraft {
    pub fn text(doc_type: DocumentType, body: impl Into<String>) -> Self {
        Self {
            doc_type,
            content: DocumentContent::Text { body: body.into() },
        }
    }
}
