//! Base Agent trait and supporting types.

use async_trait::async_trait;
use pf_protocol::document_models::DocumentDraft;
use pf_protocol::step_models::StepId;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Context information passed to agents during execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// The process the step belongs to.
    pub process_id: String,

    /// The step being executed.
    pub step_id: StepId,

    /// What the agent is asked to do.
    pub instruction: String,

    /// The step input: the requirement or the previous step's output.
    pub input: Option<String>,
}

impl ExecutionContext {
    /// Create a new ExecutionContext without input.
    pub fn new(process_id: impl Into<String>, step_id: StepId, instruction: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            step_id,
            instruction: instruction.into(),
            input: None,
        }
    }

    /// Set the step input.
    pub fn with_input(mut self, input: Option<String>) -> Self {
        self.input = input;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Thought(String),
    MessageChunk(String),
    /// A document the agent wants attached to the step.
    Document(DocumentDraft),
    Completed,
}

pub type AgentStream = Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent not available: {0}")]
    NotAvailable(String),
    #[error("Agent not found: {0}")]
    NotFound(String),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

#[async_trait]
pub trait Agent: Send + Sync {
    async fn check_availability(&self) -> bool;
    async fn execute(&self, context: &ExecutionContext) -> Result<AgentStream, AgentError>;
}
