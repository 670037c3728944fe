//! Agent manager for orchestrating multiple agents.
//!
//! The `AgentManager` is responsible for:
//! - Registering agents by name from their configurations
//! - Looking up agents by name, with fallback when one is unavailable
//! - Collecting an agent's event stream into an output and documents

use crate::agents::adapters::MockAgent;
use crate::agents::base::{Agent, AgentError, AgentEvent, AgentStream, ExecutionContext};
use pf_protocol::agent_models;
use pf_protocol::document_models::DocumentDraft;
use pf_protocol::step_models::{DEMAND_CHALLENGE, DEMAND_MANAGER, DEMAND_REFINE, RESEARCH_ANALYST};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_stream::StreamExt;

/// What an agent produced for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOutput {
    /// Message chunks joined in arrival order.
    pub output: String,
    pub documents: Vec<DocumentDraft>,
}

/// Manages all registered agents and provides orchestration logic.
pub struct AgentManager {
    agents: HashMap<String, Arc<dyn Agent>>,
    fallback_agent_name: Option<String>,
}

fn mock_for(name: &str) -> MockAgent {
    if name == RESEARCH_ANALYST {
        MockAgent::research_analyst(name)
    } else {
        MockAgent::drafting(name)
    }
}

impl AgentManager {
    /// Create a new AgentManager with the given agent configurations.
    ///
    /// Every configured agent is backed by a content-generating mock, and the
    /// four agents that own steps of the graph are always registered even
    /// when no configuration file names them.
    ///
    /// # Arguments
    ///
    /// * `configs` - Agent configurations from `.product-flow/agents/*.md`
    pub fn new(configs: Vec<agent_models::Agent>) -> Self {
        let mut agents: HashMap<String, Arc<dyn Agent>> = HashMap::new();

        for config in configs {
            let mock = mock_for(&config.name);
            agents.insert(config.name, Arc::new(mock));
        }
        for name in [DEMAND_MANAGER, RESEARCH_ANALYST, DEMAND_CHALLENGE, DEMAND_REFINE] {
            agents
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(mock_for(name)));
        }

        Self {
            agents,
            fallback_agent_name: None,
        }
    }

    /// Register or replace an agent.
    pub fn register(&mut self, name: impl Into<String>, agent: Arc<dyn Agent>) {
        self.agents.insert(name.into(), agent);
    }

    /// Set the fallback agent to use when the requested agent is unavailable.
    pub fn with_fallback(mut self, agent_name: String) -> Self {
        self.fallback_agent_name = Some(agent_name);
        self
    }

    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Execute an instruction with the specified agent.
    ///
    /// # Behavior
    ///
    /// 1. Look up the requested agent
    /// 2. Check if it's available
    /// 3. If unavailable and fallback is configured, try fallback agent
    /// 4. Execute with the selected agent
    pub async fn execute(
        &self,
        agent_name: &str,
        context: &ExecutionContext,
    ) -> Result<AgentStream, AgentError> {
        let agent = self
            .get_agent(agent_name)
            .ok_or_else(|| AgentError::NotFound(agent_name.to_string()))?;

        if agent.check_availability().await {
            return agent.execute(context).await;
        }

        if let Some(ref fallback_name) = self.fallback_agent_name {
            if fallback_name != agent_name {
                if let Some(fallback_agent) = self.get_agent(fallback_name) {
                    if fallback_agent.check_availability().await {
                        tracing::warn!(
                            agent = agent_name,
                            fallback = %fallback_name,
                            "agent unavailable, using fallback"
                        );
                        return fallback_agent.execute(context).await;
                    }
                }
            }
        }

        Err(AgentError::NotAvailable(format!(
            "Agent '{}' is not available and no fallback succeeded",
            agent_name
        )))
    }

    /// Execute and drain the stream into an [`AgentOutput`].
    ///
    /// The first error in the stream aborts the dispatch.
    pub async fn dispatch(
        &self,
        agent_name: &str,
        context: &ExecutionContext,
    ) -> Result<AgentOutput, AgentError> {
        let mut stream = self.execute(agent_name, context).await?;
        let mut chunks = Vec::new();
        let mut documents = Vec::new();

        while let Some(event) = stream.next().await {
            match event? {
                AgentEvent::Thought(thought) => {
                    tracing::debug!(agent = agent_name, step = %context.step_id, %thought);
                }
                AgentEvent::MessageChunk(chunk) => chunks.push(chunk),
                AgentEvent::Document(draft) => documents.push(draft),
                AgentEvent::Completed => break,
            }
        }

        Ok(AgentOutput {
            output: chunks.join("\n"),
            documents,
        })
    }

    /// List all registered agent names, sorted.
    pub fn list_agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }
}

impl Default for AgentManager {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
