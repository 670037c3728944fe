//! Agent configuration models for `.product-flow/agents/*.md`.
//!
//! Agents are defined as Markdown files with YAML front matter.

use crate::step_models::StepId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An automated collaborator's configuration and system prompt.
///
/// # Example
///
/// ```markdown
/// ---
/// name: demand-challenge
/// description: Challenges requirement designs
/// model: claude-sonnet-4
/// steps: ["1.4"]
/// ---
///
/// You are a critical reviewer of product requirement documents...
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct Agent {
    /// Unique identifier; matches the agent owner names of the step graph.
    pub name: String,

    /// Human-readable description of the agent's purpose.
    pub description: String,

    /// Model the agent runs on.
    pub model: String,

    /// Steps this agent owns. Ownership is fixed by the step graph, so the
    /// loader rejects a step whose graph owner is anyone else.
    #[serde(default)]
    pub steps: Vec<StepId>,

    /// Body of the .md file, not part of the front matter.
    #[serde(skip)]
    pub system_prompt: String,
}
