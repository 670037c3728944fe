//! The fixed step graph of the product-definition workflow.
//!
//! The pipeline is known at compile time: twelve steps, each owned either by
//! an automated agent or by a human gate. Identifier `1.10` does not exist;
//! the numbering jumps from `1.9` to `1.11`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// Agent that owns clarification, design and revision work.
pub const DEMAND_MANAGER: &str = "demand-manager";
/// Agent that produces market research reports.
pub const RESEARCH_ANALYST: &str = "research-analyst";
/// Agent that challenges requirement designs.
pub const DEMAND_CHALLENGE: &str = "demand-challenge";
/// Agent that refines the final requirement document.
pub const DEMAND_REFINE: &str = "demand-refine";

/// Identifier of one step in the fixed pipeline.
///
/// Variants are declared in pipeline order, so the derived `Ord` matches the
/// order in which steps are executed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
pub enum StepId {
    #[serde(rename = "1.1")]
    Clarification,
    #[serde(rename = "1.2")]
    MarketResearch,
    #[serde(rename = "1.3")]
    RequirementDesign,
    #[serde(rename = "1.4")]
    DesignChallenge,
    #[serde(rename = "1.5")]
    ChallengeResponse,
    #[serde(rename = "1.6")]
    HumanArbitration,
    #[serde(rename = "1.7")]
    DesignUpdate,
    #[serde(rename = "1.8")]
    HumanEvaluation,
    #[serde(rename = "1.9")]
    DocumentRevision,
    #[serde(rename = "1.11")]
    DivergenceCheck,
    #[serde(rename = "1.12")]
    DocumentRefinement,
    #[serde(rename = "1.13")]
    MandatoryCheckpoint,
}

impl StepId {
    /// Every step, in pipeline order.
    pub const ALL: [StepId; 12] = [
        StepId::Clarification,
        StepId::MarketResearch,
        StepId::RequirementDesign,
        StepId::DesignChallenge,
        StepId::ChallengeResponse,
        StepId::HumanArbitration,
        StepId::DesignUpdate,
        StepId::HumanEvaluation,
        StepId::DocumentRevision,
        StepId::DivergenceCheck,
        StepId::DocumentRefinement,
        StepId::MandatoryCheckpoint,
    ];

    /// The first step of every process.
    pub const FIRST: StepId = StepId::Clarification;

    /// The terminal step; completing it completes the process.
    pub const LAST: StepId = StepId::MandatoryCheckpoint;

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Clarification => "1.1",
            StepId::MarketResearch => "1.2",
            StepId::RequirementDesign => "1.3",
            StepId::DesignChallenge => "1.4",
            StepId::ChallengeResponse => "1.5",
            StepId::HumanArbitration => "1.6",
            StepId::DesignUpdate => "1.7",
            StepId::HumanEvaluation => "1.8",
            StepId::DocumentRevision => "1.9",
            StepId::DivergenceCheck => "1.11",
            StepId::DocumentRefinement => "1.12",
            StepId::MandatoryCheckpoint => "1.13",
        }
    }

    /// Human-readable step name.
    pub fn name(self) -> &'static str {
        match self {
            StepId::Clarification => "clarification",
            StepId::MarketResearch => "market research",
            StepId::RequirementDesign => "requirement design",
            StepId::DesignChallenge => "design challenge",
            StepId::ChallengeResponse => "challenge response",
            StepId::HumanArbitration => "human arbitration",
            StepId::DesignUpdate => "design update",
            StepId::HumanEvaluation => "human evaluation",
            StepId::DocumentRevision => "document revision",
            StepId::DivergenceCheck => "divergence check",
            StepId::DocumentRefinement => "document refinement",
            StepId::MandatoryCheckpoint => "mandatory checkpoint",
        }
    }

    /// Name of the agent that owns this step, or `None` for a human gate.
    pub fn agent(self) -> Option<&'static str> {
        match self {
            StepId::Clarification
            | StepId::RequirementDesign
            | StepId::ChallengeResponse
            | StepId::DesignUpdate
            | StepId::DocumentRevision
            | StepId::DivergenceCheck => Some(DEMAND_MANAGER),
            StepId::MarketResearch => Some(RESEARCH_ANALYST),
            StepId::DesignChallenge => Some(DEMAND_CHALLENGE),
            StepId::DocumentRefinement => Some(DEMAND_REFINE),
            StepId::HumanArbitration | StepId::HumanEvaluation | StepId::MandatoryCheckpoint => {
                None
            }
        }
    }

    pub fn is_human_gate(self) -> bool {
        self.agent().is_none()
    }

    /// The step that follows this one in table order.
    pub fn next(self) -> Option<StepId> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// The step that precedes this one in table order.
    pub fn previous(self) -> Option<StepId> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the twelve steps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown step identifier: {0}")]
pub struct UnknownStepId(pub String);

impl FromStr for StepId {
    type Err = UnknownStepId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| UnknownStepId(s.to_string()))
    }
}

const JUDGMENT_SUFFIX: &str = "_judgment";

/// Where a process currently sits in the step graph.
///
/// Either a plain step, or the pseudo-state that awaits a branching decision
/// before a step (serialised as `"1.2_judgment"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepLocation {
    Step(StepId),
    Judgment(StepId),
}

impl StepLocation {
    /// The step this location refers to.
    pub fn step(self) -> StepId {
        match self {
            StepLocation::Step(step) | StepLocation::Judgment(step) => step,
        }
    }

    pub fn is_judgment(self) -> bool {
        matches!(self, StepLocation::Judgment(_))
    }
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepLocation::Step(step) => write!(f, "{step}"),
            StepLocation::Judgment(step) => write!(f, "{step}{JUDGMENT_SUFFIX}"),
        }
    }
}

impl FromStr for StepLocation {
    type Err = UnknownStepId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix(JUDGMENT_SUFFIX) {
            Some(step) => step
                .parse()
                .map(StepLocation::Judgment)
                .map_err(|_| UnknownStepId(s.to_string())),
            None => s.parse().map(StepLocation::Step),
        }
    }
}

impl Serialize for StepLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StepLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a single step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    /// Bypassed without running. The market research branch skips 1.2 this
    /// way; a direct status update can set it on any step.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_graph_has_twelve_steps_without_1_10() {
        assert_eq!(StepId::ALL.len(), 12);
        assert!("1.10".parse::<StepId>().is_err());
        assert_eq!(StepId::DocumentRevision.next(), Some(StepId::DivergenceCheck));
    }

    #[test]
    fn test_human_gates() {
        let gates: Vec<_> = StepId::ALL
            .iter()
            .filter(|s| s.is_human_gate())
            .map(|s| s.as_str())
            .collect();
        assert_eq!(gates, vec!["1.6", "1.8", "1.13"]);
    }

    #[test]
    fn test_next_and_previous() {
        assert_eq!(StepId::FIRST.previous(), None);
        assert_eq!(StepId::LAST.next(), None);
        assert_eq!(StepId::Clarification.next(), Some(StepId::MarketResearch));
        assert_eq!(
            StepId::MandatoryCheckpoint.previous(),
            Some(StepId::DocumentRefinement)
        );
    }

    #[test]
    fn test_step_location_parse_and_display() {
        let judgment: StepLocation = "1.2_judgment".parse().unwrap();
        assert_eq!(judgment, StepLocation::Judgment(StepId::MarketResearch));
        assert_eq!(judgment.to_string(), "1.2_judgment");

        let plain: StepLocation = "1.11".parse().unwrap();
        assert_eq!(plain, StepLocation::Step(StepId::DivergenceCheck));
        assert!("1.10_judgment".parse::<StepLocation>().is_err());
        assert!("bogus".parse::<StepLocation>().is_err());
    }

    #[test]
    fn test_step_id_serializes_as_identifier() {
        let json = serde_json::to_value(StepId::MandatoryCheckpoint).unwrap();
        assert_eq!(json, "1.13");
        let status = serde_json::to_value(StepStatus::InProgress).unwrap();
        assert_eq!(status, "in_progress");
    }
}
