//! Mock agent implementation.
//!
//! Stands in for the external content generators: either replays a fixed
//! script of events, or drafts deterministic content for whatever step it is
//! asked to execute.

use crate::agents::base::{Agent, AgentError, AgentEvent, AgentStream, ExecutionContext};
use async_trait::async_trait;
use pf_protocol::document_models::{
    CompetitorProfile, DocumentContent, DocumentDraft, DocumentType,
};

#[derive(Clone)]
enum Behavior {
    Scripted(Vec<Result<AgentEvent, AgentError>>),
    Drafting,
    Research,
}

#[derive(Clone)]
pub struct MockAgent {
    name: String,
    available: bool,
    behavior: Behavior,
}

impl MockAgent {
    /// Replays `events` on every execution.
    pub fn new(available: bool, events: Vec<Result<AgentEvent, AgentError>>) -> Self {
        Self {
            name: "mock".to_string(),
            available,
            behavior: Behavior::Scripted(events),
        }
    }

    /// Drafts a text document of the step's default type from the step input.
    pub fn drafting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: true,
            behavior: Behavior::Drafting,
        }
    }

    /// Produces a research report with two competitor profiles.
    pub fn research_analyst(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: true,
            behavior: Behavior::Research,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(false, vec![])
    }

    pub fn failing() -> Self {
        Self::new(
            true,
            vec![
                Ok(AgentEvent::Thought("Starting...".to_string())),
                Err(AgentError::ExecutionError("Mock failure".to_string())),
            ],
        )
    }
}

fn research_report(context: &ExecutionContext) -> DocumentDraft {
    let subject = context.input.clone().unwrap_or_default();
    DocumentDraft {
        doc_type: DocumentType::ResearchReport,
        content: DocumentContent::ResearchReport {
            summary: format!("Competitive landscape for: {subject}"),
            competitors: vec![
                CompetitorProfile {
                    name: "Competitor A".to_string(),
                    strengths: vec!["Mature feature set".to_string(), "Large user base".to_string()],
                    weaknesses: vec!["Dated interface".to_string()],
                    market_share: "35%".to_string(),
                },
                CompetitorProfile {
                    name: "Competitor B".to_string(),
                    strengths: vec!["Modern interface".to_string()],
                    weaknesses: vec!["Limited integrations".to_string(), "Higher price".to_string()],
                    market_share: "20%".to_string(),
                },
            ],
            recommendations: vec![
                "Differentiate on onboarding speed".to_string(),
                "Offer integrations the competitors lack".to_string(),
            ],
        },
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn check_availability(&self) -> bool {
        self.available
    }

    async fn execute(&self, context: &ExecutionContext) -> Result<AgentStream, AgentError> {
        if !self.available {
            return Err(AgentError::NotAvailable(format!(
                "Mock agent '{}' not available",
                self.name
            )));
        }

        let behavior = self.behavior.clone();
        let name = self.name.clone();
        let context = context.clone();

        let stream = async_stream::stream! {
            match behavior {
                Behavior::Scripted(events) => {
                    for event in events {
                        yield event;
                    }
                }
                Behavior::Drafting => {
                    let step = context.step_id;
                    yield Ok(AgentEvent::Thought(format!("{name} working on step {step}")));
                    let body = format!(
                        "{} by {name}\n\n{}",
                        step.name(),
                        context.input.as_deref().unwrap_or(&context.instruction)
                    );
                    yield Ok(AgentEvent::MessageChunk(format!("{} drafted", step.name())));
                    yield Ok(AgentEvent::Document(DocumentDraft::text(
                        DocumentType::default_for_step(step),
                        body,
                    )));
                    yield Ok(AgentEvent::Completed);
                }
                Behavior::Research => {
                    yield Ok(AgentEvent::Thought(format!("{name} surveying competitors")));
                    yield Ok(AgentEvent::MessageChunk("Identified 2 competitors".to_string()));
                    yield Ok(AgentEvent::Document(research_report(&context)));
                    yield Ok(AgentEvent::Completed);
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
