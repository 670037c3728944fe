//! Mock agents for deterministic testing.

use async_trait::async_trait;
use pf_core::agents::base::{Agent, AgentError, AgentEvent, AgentStream, ExecutionContext};
use std::sync::{Arc, Mutex};

/// Replies with a single message chunk and no documents, and remembers every
/// context it was executed with.
#[derive(Clone, Default)]
pub struct RecordingAgent {
    pub calls: Arc<Mutex<Vec<ExecutionContext>>>,
}

#[allow(dead_code)]
impl RecordingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ExecutionContext> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn execute(&self, context: &ExecutionContext) -> Result<AgentStream, AgentError> {
        self.calls.lock().unwrap().push(context.clone());
        let reply = format!("handled {}", context.step_id);
        Ok(Box::pin(tokio_stream::iter(vec![
            Ok(AgentEvent::MessageChunk(reply)),
            Ok(AgentEvent::Completed),
        ])))
    }
}
