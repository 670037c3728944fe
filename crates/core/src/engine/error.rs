//! Error types for workflow operations.

use crate::agents::base::AgentError;
use crate::store::StoreError;
use pf_protocol::step_models::UnknownStepId;
use thiserror::Error;

/// Errors surfaced by every workflow operation.
///
/// None of these are retried internally; the engine is a deterministic state
/// transformer and a caller may reissue an operation after fixing its input.
#[derive(Error, Debug)]
pub enum FlowError {
    /// A process or document id is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A step id outside the fixed twelve.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// The requested transition is not legal from the current state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Input rejected before any state was touched.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The persistence adapter could not load or save.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The agent owning a step failed to produce its output.
    #[error("Agent failed: {0}")]
    Agent(#[from] AgentError),
}

impl FlowError {
    pub fn process_not_found(id: impl Into<String>) -> Self {
        FlowError::NotFound {
            entity: "process",
            id: id.into(),
        }
    }

    pub fn document_not_found(id: impl Into<String>) -> Self {
        FlowError::NotFound {
            entity: "document",
            id: id.into(),
        }
    }

    pub fn invalid_transition(reason: impl Into<String>) -> Self {
        FlowError::InvalidTransition(reason.into())
    }
}

impl From<UnknownStepId> for FlowError {
    fn from(err: UnknownStepId) -> Self {
        FlowError::UnknownStep(err.0)
    }
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => FlowError::process_not_found(id),
            other => FlowError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Type alias for Result with FlowError.
pub type FlowResult<T> = Result<T, FlowError>;
