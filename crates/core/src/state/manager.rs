//! Flow manager: the orchestrator façade over the engine.
//!
//! The FlowManager owns the persistence adapter and the agent registry and
//! exposes every workflow operation as an async method. Each mutation is a
//! read-modify-write of the whole aggregate under a per-process lock:
//!
//! 1. acquire the lock for the process id
//! 2. load the aggregate from the store
//! 3. apply one engine transformation
//! 4. recompute status and save
//! 5. publish the buffered events
//!
//! Operations on different process ids never wait on each other.

use crate::agents::base::ExecutionContext;
use crate::agents::manager::AgentManager;
use crate::config::models::AppConfig;
use crate::engine::clarification::SubmissionOutcome;
use crate::engine::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::engine::error::{FlowError, FlowResult};
use crate::engine::heuristics::KeywordRules;
use crate::engine::pipeline::{self, MarketResearchDecision};
use crate::engine::{steps, FlowContext};
use crate::state::locks::ProcessLocks;
use crate::state::process::{create_process, refresh_status};
use crate::store::{JsonFileStore, ProcessStore};
use pf_protocol::document_models::DocumentDraft;
use pf_protocol::ipc::{Event, HumanDecision, Op};
use pf_protocol::process_models::Process;
use pf_protocol::step_models::{StepId, StepStatus, RESEARCH_ANALYST};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of [`FlowManager::dispatch`].
#[derive(Debug, Clone)]
pub enum OpOutcome {
    Process(Process),
    Processes(Vec<Process>),
    Submission {
        process: Process,
        outcome: SubmissionOutcome,
    },
    Judgment {
        process: Process,
        decision: MarketResearchDecision,
    },
}

/// Coordinates all workflow operations against a process store.
pub struct FlowManager {
    store: Arc<dyn ProcessStore>,

    agents: AgentManager,

    clock: Arc<dyn Clock>,

    ids: Arc<dyn IdGenerator>,

    rules: KeywordRules,

    /// Recorded as `answered_by` when a submission names nobody.
    default_responder: String,

    /// Serializes operations per process id.
    locks: ProcessLocks,

    /// Channel for sending events to the front end.
    events_tx: mpsc::Sender<Event>,
}

impl FlowManager {
    /// Create a new FlowManager with the system clock and random ids.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence adapter for process aggregates
    /// * `agents` - Registry of the agents that own steps
    /// * `events_tx` - Channel for sending events to the front end
    pub fn new(
        store: Arc<dyn ProcessStore>,
        agents: AgentManager,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            store,
            agents,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            rules: KeywordRules::default(),
            default_responder: "user".to_string(),
            locks: ProcessLocks::new(),
            events_tx,
        }
    }

    /// Build a manager from loaded configuration, storing processes as JSON
    /// files under `root` joined with the configured data directory.
    pub fn from_config(config: &AppConfig, root: &Path, events_tx: mpsc::Sender<Event>) -> Self {
        let store = JsonFileStore::new(root.join(&config.global.data_dir));
        Self::new(
            Arc::new(store),
            AgentManager::new(config.agents.clone()),
            events_tx,
        )
        .with_rules(KeywordRules::from_config(&config.global.keywords))
        .with_default_responder(config.global.default_responder.clone())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_rules(mut self, rules: KeywordRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_default_responder(mut self, responder: String) -> Self {
        self.default_responder = responder;
        self
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            if let Err(e) = self.events_tx.try_send(event) {
                tracing::warn!(error = %e, "dropping workflow event");
            }
        }
    }

    /// Apply `f` to a loaded aggregate, then recompute status, save and
    /// publish. The caller must hold the process lock.
    async fn apply<T, F>(&self, mut process: Process, f: F) -> FlowResult<(Process, T)>
    where
        F: FnOnce(&mut Process, &mut FlowContext<'_>) -> FlowResult<T>,
    {
        let (value, events) = {
            let mut ctx = FlowContext::new(self.clock.as_ref(), self.ids.as_ref(), &self.rules);
            let value = f(&mut process, &mut ctx)?;
            refresh_status(&mut process, &mut ctx);
            (value, ctx.into_events())
        };

        self.store.save(&process).await?;
        self.publish(events);
        Ok((process, value))
    }

    /// Lock, load and apply `f` to one process.
    async fn mutate<T, F>(&self, process_id: &str, f: F) -> FlowResult<(Process, T)>
    where
        F: FnOnce(&mut Process, &mut FlowContext<'_>) -> FlowResult<T>,
    {
        let _guard = self.locks.acquire(process_id).await;

        let process = self.store.load(process_id).await?;
        self.apply(process, f).await
    }

    /// Create a process with clarification round 1 open.
    ///
    /// The aggregate is built completely in memory and saved once, so no
    /// partially initialized process is ever persisted.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for a blank name or requirement, and
    /// `StorageUnavailable` if the save fails.
    pub async fn create(
        &self,
        name: &str,
        requirement: &str,
        version_id: &str,
        project_id: &str,
    ) -> FlowResult<Process> {
        let (mut process, events) = {
            let mut ctx = FlowContext::new(self.clock.as_ref(), self.ids.as_ref(), &self.rules);
            let mut process = create_process(&mut ctx, name, requirement, version_id, project_id)?;
            refresh_status(&mut process, &mut ctx);
            (process, ctx.into_events())
        };
        process.updated_at = process.created_at;

        self.store.save(&process).await?;
        self.publish(events);
        Ok(process)
    }

    pub async fn get(&self, process_id: &str) -> FlowResult<Process> {
        Ok(self.store.load(process_id).await?)
    }

    pub async fn list(&self) -> FlowResult<Vec<Process>> {
        Ok(self.store.list().await?)
    }

    /// Answer the open clarification round.
    ///
    /// `answered_by` defaults to the configured responder.
    pub async fn submit_clarification(
        &self,
        process_id: &str,
        responses: &BTreeMap<String, String>,
        answered_by: Option<&str>,
    ) -> FlowResult<(Process, SubmissionOutcome)> {
        let responder = answered_by.unwrap_or(&self.default_responder).to_string();
        self.mutate(process_id, |process, ctx| {
            pipeline::submit_clarification(process, ctx, responses, &responder)
        })
        .await
    }

    /// Resolve the `1.2_judgment` branch. A `NotRequired` decision changes
    /// nothing, so the process is neither saved nor announced.
    pub async fn judge_market_research(
        &self,
        process_id: &str,
    ) -> FlowResult<(Process, MarketResearchDecision)> {
        let _guard = self.locks.acquire(process_id).await;
        let process = self.store.load(process_id).await?;

        match pipeline::market_research_decision(&process)? {
            MarketResearchDecision::Required => {
                self.apply(process, pipeline::judge_market_research).await
            }
            MarketResearchDecision::NotRequired => {
                tracing::info!(process_id, "market research not indicated, nothing to save");
                Ok((process, MarketResearchDecision::NotRequired))
            }
        }
    }

    /// Run the research analyst and record its report on step 1.2.
    pub async fn run_market_research(&self, process_id: &str) -> FlowResult<Process> {
        let _guard = self.locks.acquire(process_id).await;

        let process = self.store.load(process_id).await?;
        pipeline::ensure_market_research_open(&process)?;

        let context = ExecutionContext::new(
            process_id,
            StepId::MarketResearch,
            "Research competitors and the market for this requirement",
        )
        .with_input(Some(process.requirement.clone()));
        let result = self.agents.dispatch(RESEARCH_ANALYST, &context).await?;

        let (process, ()) = self
            .apply(process, |process, ctx| {
                pipeline::run_market_research(process, ctx, result.output, result.documents)
            })
            .await?;
        Ok(process)
    }

    pub async fn skip_market_research(&self, process_id: &str) -> FlowResult<Process> {
        let (process, ()) = self
            .mutate(process_id, pipeline::skip_market_research)
            .await?;
        Ok(process)
    }

    /// Dispatch the current step to its owning agent and record the result.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` at a human gate, at the judgment, or on
    /// steps 1.1 and 1.2; `Agent` if the agent fails.
    pub async fn run_agent_step(&self, process_id: &str) -> FlowResult<Process> {
        let _guard = self.locks.acquire(process_id).await;

        let process = self.store.load(process_id).await?;
        let (step_id, agent, input) = pipeline::agent_target(&process)?;

        tracing::info!(process_id, step = %step_id, agent, "dispatching step to agent");
        let context = ExecutionContext::new(process_id, step_id, step_id.name())
            .with_input(Some(input.clone()));
        let result = self.agents.dispatch(agent, &context).await?;

        let (process, ()) = self
            .apply(process, |process, ctx| {
                pipeline::record_agent_output(
                    process,
                    ctx,
                    step_id,
                    input,
                    result.output,
                    result.documents,
                )
            })
            .await?;
        Ok(process)
    }

    /// Record an externally produced output for the step at the pointer.
    pub async fn complete_step(
        &self,
        process_id: &str,
        step_id: StepId,
        output: String,
        documents: Vec<DocumentDraft>,
    ) -> FlowResult<Process> {
        let (process, ()) = self
            .mutate(process_id, |process, ctx| {
                pipeline::complete_step(process, ctx, step_id, output, documents)
            })
            .await?;
        Ok(process)
    }

    /// Record a human decision at the current gate.
    pub async fn record_human_decision(
        &self,
        process_id: &str,
        decision: HumanDecision,
        notes: Option<String>,
    ) -> FlowResult<Process> {
        let (process, _) = self
            .mutate(process_id, |process, ctx| {
                pipeline::record_human_decision(process, ctx, decision, notes)
            })
            .await?;
        Ok(process)
    }

    /// Raw step status update. Never moves the pointer.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStep` if `step` is not one of the twelve identifiers.
    pub async fn update_step(
        &self,
        process_id: &str,
        step: &str,
        status: StepStatus,
        output: Option<String>,
    ) -> FlowResult<Process> {
        let step_id: StepId = step.parse()?;
        let (process, ()) = self
            .mutate(process_id, |process, ctx| {
                steps::update_step(process, ctx, step_id, status, output)
            })
            .await?;
        Ok(process)
    }

    /// Execute one protocol operation.
    pub async fn dispatch(&self, op: Op) -> FlowResult<OpOutcome> {
        tracing::debug!(?op, "dispatching operation");
        let outcome = match op {
            Op::CreateProcess {
                name,
                requirement,
                version_id,
                project_id,
            } => OpOutcome::Process(
                self.create(&name, &requirement, &version_id, &project_id)
                    .await?,
            ),
            Op::SubmitClarification {
                process_id,
                responses,
                answered_by,
            } => {
                let (process, outcome) = self
                    .submit_clarification(&process_id, &responses, answered_by.as_deref())
                    .await?;
                OpOutcome::Submission { process, outcome }
            }
            Op::JudgeMarketResearch { process_id } => {
                let (process, decision) = self.judge_market_research(&process_id).await?;
                OpOutcome::Judgment { process, decision }
            }
            Op::RunMarketResearch { process_id } => {
                OpOutcome::Process(self.run_market_research(&process_id).await?)
            }
            Op::SkipMarketResearch { process_id } => {
                OpOutcome::Process(self.skip_market_research(&process_id).await?)
            }
            Op::RunAgentStep { process_id } => {
                OpOutcome::Process(self.run_agent_step(&process_id).await?)
            }
            Op::CompleteStep {
                process_id,
                step_id,
                output,
                documents,
            } => OpOutcome::Process(
                self.complete_step(&process_id, step_id, output, documents)
                    .await?,
            ),
            Op::RecordHumanDecision {
                process_id,
                decision,
                notes,
            } => OpOutcome::Process(
                self.record_human_decision(&process_id, decision, notes)
                    .await?,
            ),
            Op::UpdateStep {
                process_id,
                step_id,
                status,
                output,
            } => OpOutcome::Process(
                self.update_step(&process_id, step_id.as_str(), status, output)
                    .await?,
            ),
            Op::GetProcess { process_id } => OpOutcome::Process(self.get(&process_id).await?),
            Op::ListProcesses => OpOutcome::Processes(self.list().await?),
        };
        Ok(outcome)
    }
}
