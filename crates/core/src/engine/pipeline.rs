//! Pipeline transitions built on the step machine.
//!
//! Each function here is a pure state transformation over a loaded process:
//! it checks legality against `current_step`, mutates the aggregate and
//! records events on the context. Loading, locking and saving belong to
//! [`crate::state::manager::FlowManager`].

use crate::engine::clarification::{self, SubmissionOutcome};
use crate::engine::documents;
use crate::engine::error::{FlowError, FlowResult};
use crate::engine::steps;
use crate::engine::FlowContext;
use pf_protocol::document_models::{DocumentContent, DocumentDraft, DocumentStatus, DocumentType};
use pf_protocol::ipc::HumanDecision;
use pf_protocol::process_models::Process;
use pf_protocol::step_models::{StepId, StepLocation, StepStatus};
use std::collections::BTreeMap;

/// Result of resolving the `1.2_judgment` branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketResearchDecision {
    /// Step 1.2 is now in progress and waits for a research run.
    Required,
    /// Research is not indicated; the pointer stays at the judgment.
    NotRequired,
}

/// Answer the open clarification round. On full completion step 1.1 is
/// completed and the pointer moves to `1.2_judgment`.
pub fn submit_clarification(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    responses: &BTreeMap<String, String>,
    answered_by: &str,
) -> FlowResult<SubmissionOutcome> {
    steps::ensure_current(process, StepId::Clarification)?;
    let outcome = clarification::submit_responses(process, ctx, responses, answered_by)?;

    if let SubmissionOutcome::Completed {
        needs_market_research,
        ..
    } = &outcome
    {
        let round_count = clarification::rounds(process).len();
        let output = format!(
            "clarification completed after {round_count} round(s); market research {}",
            if *needs_market_research {
                "recommended"
            } else {
                "not indicated"
            }
        );
        steps::complete_and_advance(process, ctx, StepId::Clarification, output)?;
    }
    Ok(outcome)
}

/// The market research decision at `1.2_judgment`, without applying it.
pub fn market_research_decision(process: &Process) -> FlowResult<MarketResearchDecision> {
    if process.current_step != StepLocation::Judgment(StepId::MarketResearch) {
        return Err(FlowError::invalid_transition(format!(
            "market research judgment requires 1.2_judgment, current step is {}",
            process.current_step
        )));
    }
    let verdict = clarification::latest_market_research_verdict(process).ok_or_else(|| {
        FlowError::invalid_transition("no clarification analysis to judge from")
    })?;

    Ok(if verdict {
        MarketResearchDecision::Required
    } else {
        MarketResearchDecision::NotRequired
    })
}

/// Resolve the market research branch from the latest clarification analysis.
///
/// `NotRequired` leaves the aggregate untouched.
pub fn judge_market_research(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
) -> FlowResult<MarketResearchDecision> {
    let decision = market_research_decision(process)?;
    match decision {
        MarketResearchDecision::Required => {
            steps::move_to(process, ctx, StepLocation::Step(StepId::MarketResearch))?;
        }
        MarketResearchDecision::NotRequired => {
            tracing::info!(process_id = %process.id, "market research not indicated");
        }
    }
    Ok(decision)
}

/// Research and skip are both legal from the judgment pseudo-state and from
/// a running step 1.2.
pub fn ensure_market_research_open(process: &Process) -> FlowResult<()> {
    let at_branch = matches!(
        process.current_step,
        StepLocation::Judgment(StepId::MarketResearch) | StepLocation::Step(StepId::MarketResearch)
    );
    let status = process.step(StepId::MarketResearch).map(|s| s.status);
    let open = matches!(status, Some(StepStatus::Pending | StepStatus::InProgress));
    if at_branch && open {
        Ok(())
    } else {
        Err(FlowError::invalid_transition(format!(
            "market research is not open (current step {})",
            process.current_step
        )))
    }
}

/// Record a research run: a completed research document, step 1.2 completed,
/// pointer on 1.3.
pub fn run_market_research(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    output: String,
    mut drafts: Vec<DocumentDraft>,
) -> FlowResult<()> {
    ensure_market_research_open(process)?;
    if process.current_step != StepLocation::Step(StepId::MarketResearch) {
        steps::move_to(process, ctx, StepLocation::Step(StepId::MarketResearch))?;
    }

    if !drafts
        .iter()
        .any(|d| d.doc_type == DocumentType::ResearchReport)
    {
        drafts.push(DocumentDraft {
            doc_type: DocumentType::ResearchReport,
            content: DocumentContent::ResearchReport {
                summary: output.clone(),
                competitors: Vec::new(),
                recommendations: Vec::new(),
            },
        });
    }
    for draft in drafts {
        documents::create_document(
            process,
            ctx,
            StepId::MarketResearch,
            draft,
            DocumentStatus::Completed,
        )?;
    }

    steps::complete_and_advance(process, ctx, StepId::MarketResearch, output)
}

/// Skip step 1.2 outright and move on to 1.3.
pub fn skip_market_research(process: &mut Process, ctx: &mut FlowContext<'_>) -> FlowResult<()> {
    ensure_market_research_open(process)?;
    steps::update_step(process, ctx, StepId::MarketResearch, StepStatus::Skipped, None)?;
    steps::move_to(process, ctx, StepLocation::Step(StepId::RequirementDesign))
}

/// Record an externally produced output for the current step and advance.
///
/// Steps 1.1 and 1.2 have dedicated operations and are rejected here.
pub fn complete_step(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    step_id: StepId,
    output: String,
    drafts: Vec<DocumentDraft>,
) -> FlowResult<()> {
    if matches!(step_id, StepId::Clarification | StepId::MarketResearch) {
        return Err(FlowError::invalid_transition(format!(
            "step {step_id} is completed through its dedicated operation"
        )));
    }
    steps::ensure_current(process, step_id)?;

    for draft in drafts {
        documents::create_document(process, ctx, step_id, draft, DocumentStatus::Completed)?;
    }
    steps::complete_and_advance(process, ctx, step_id, output)
}

/// Record a human decision at the current gate.
///
/// `Revise` at the mandatory checkpoint sends the pointer back to document
/// refinement; everywhere else the gate completes and the pipeline moves on.
/// Returns the step the pointer ends on.
pub fn record_human_decision(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    decision: HumanDecision,
    notes: Option<String>,
) -> FlowResult<StepId> {
    let gate = match process.current_step {
        StepLocation::Step(step) if step.is_human_gate() => step,
        other => {
            return Err(FlowError::invalid_transition(format!(
                "current step {other} is not a human gate"
            )))
        }
    };
    if process.step(gate).map(|s| s.status) == Some(StepStatus::Completed) {
        return Err(FlowError::invalid_transition(format!(
            "gate {gate} is already decided"
        )));
    }

    let record = serde_json::json!({
        "decision": decision,
        "notes": notes,
    });
    documents::create_document(
        process,
        ctx,
        gate,
        DocumentDraft {
            doc_type: DocumentType::default_for_step(gate),
            content: DocumentContent::Structured { value: record },
        },
        DocumentStatus::Completed,
    )?;

    let summary = match (decision, notes.as_deref()) {
        (HumanDecision::Approve, Some(notes)) => format!("approved: {notes}"),
        (HumanDecision::Approve, None) => "approved".to_string(),
        (HumanDecision::Revise, Some(notes)) => format!("revision requested: {notes}"),
        (HumanDecision::Revise, None) => "revision requested".to_string(),
    };

    if gate == StepId::MandatoryCheckpoint && decision == HumanDecision::Revise {
        tracing::info!(process_id = %process.id, "checkpoint sent back for refinement");
        let refinement = StepId::DocumentRefinement;
        steps::update_step(process, ctx, gate, StepStatus::Pending, None)?;
        if let Some(step) = process.step_mut(refinement) {
            step.input = Some(summary);
        }
        steps::move_to(process, ctx, StepLocation::Step(refinement))?;
        return Ok(refinement);
    }

    steps::complete_and_advance(process, ctx, gate, summary)?;
    Ok(process.current_step.step())
}

/// The agent-owned step at the pointer, its agent and the input to hand it.
///
/// The input is the step's own input when set, otherwise the output of the
/// closest completed step before it, otherwise the requirement.
pub fn agent_target(process: &Process) -> FlowResult<(StepId, &'static str, String)> {
    let step_id = match process.current_step {
        StepLocation::Step(step) => step,
        StepLocation::Judgment(_) => {
            return Err(FlowError::invalid_transition(
                "the market research judgment must be resolved first",
            ))
        }
    };
    if matches!(step_id, StepId::Clarification | StepId::MarketResearch) {
        return Err(FlowError::invalid_transition(format!(
            "step {step_id} is completed through its dedicated operation"
        )));
    }
    let agent = step_id.agent().ok_or_else(|| {
        FlowError::invalid_transition(format!("step {step_id} is a human gate"))
    })?;

    let own_input = process.step(step_id).and_then(|s| s.input.clone());
    let input = own_input
        .or_else(|| {
            std::iter::successors(step_id.previous(), |id| id.previous())
                .filter_map(|id| process.step(id))
                .find(|s| s.status == StepStatus::Completed)
                .and_then(|s| s.output.clone())
        })
        .unwrap_or_else(|| process.requirement.clone());

    Ok((step_id, agent, input))
}

/// Record what an agent produced for `step_id` and advance.
///
/// An agent that yields no document still leaves a text document of the
/// step's default type holding its output.
pub fn record_agent_output(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    step_id: StepId,
    input: String,
    output: String,
    mut drafts: Vec<DocumentDraft>,
) -> FlowResult<()> {
    steps::ensure_current(process, step_id)?;
    if let Some(step) = process.step_mut(step_id) {
        step.input.get_or_insert(input);
    }
    if drafts.is_empty() {
        drafts.push(DocumentDraft::text(
            DocumentType::default_for_step(step_id),
            output.clone(),
        ));
    }
    complete_step(process, ctx, step_id, output, drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{context_parts, empty_process};

    fn all_answers() -> BTreeMap<String, String> {
        [("q1", "Mobile users"), ("q2", "Login"), ("q3", "None")]
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_submit_completion_moves_to_judgment() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        clarification::open_round(&mut process, &mut ctx).unwrap();

        submit_clarification(&mut process, &mut ctx, &all_answers(), "pm").unwrap();

        assert_eq!(
            process.current_step,
            StepLocation::Judgment(StepId::MarketResearch)
        );
        let step = process.step(StepId::Clarification).unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert!(step.output.is_some());
        // judgment does not start step 1.2
        assert_eq!(
            process.step(StepId::MarketResearch).unwrap().status,
            StepStatus::Pending
        );
    }

    #[test]
    fn test_judgment_without_research() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        clarification::open_round(&mut process, &mut ctx).unwrap();
        submit_clarification(&mut process, &mut ctx, &all_answers(), "pm").unwrap();

        let decision = judge_market_research(&mut process, &mut ctx).unwrap();
        assert_eq!(decision, MarketResearchDecision::NotRequired);
        assert!(process.current_step.is_judgment());

        skip_market_research(&mut process, &mut ctx).unwrap();
        assert_eq!(
            process.step(StepId::MarketResearch).unwrap().status,
            StepStatus::Skipped
        );
        assert_eq!(
            process.current_step,
            StepLocation::Step(StepId::RequirementDesign)
        );
        let design = process.step(StepId::RequirementDesign).unwrap();
        assert_eq!(design.status, StepStatus::InProgress);
        assert!(design.started_at.is_some());
    }

    #[test]
    fn test_research_run_creates_report() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        clarification::open_round(&mut process, &mut ctx).unwrap();
        submit_clarification(&mut process, &mut ctx, &all_answers(), "pm").unwrap();

        run_market_research(&mut process, &mut ctx, "two competitors".to_string(), Vec::new())
            .unwrap();

        let step = process.step(StepId::MarketResearch).unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert_eq!(step.documents.len(), 1);
        assert_eq!(step.documents[0].doc_type, DocumentType::ResearchReport);
        assert_eq!(step.documents[0].status, DocumentStatus::Completed);
        assert_eq!(
            process.current_step,
            StepLocation::Step(StepId::RequirementDesign)
        );
        // research cannot run twice
        assert!(run_market_research(&mut process, &mut ctx, String::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_complete_step_rejects_wrong_pointer_and_dedicated_steps() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();

        assert!(matches!(
            complete_step(&mut process, &mut ctx, StepId::Clarification, String::new(), Vec::new()),
            Err(FlowError::InvalidTransition(_))
        ));
        assert!(matches!(
            complete_step(&mut process, &mut ctx, StepId::DesignChallenge, String::new(), Vec::new()),
            Err(FlowError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_human_decision_requires_gate() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();

        let result = record_human_decision(&mut process, &mut ctx, HumanDecision::Approve, None);
        assert!(matches!(result, Err(FlowError::InvalidTransition(_))));
    }

    #[test]
    fn test_checkpoint_revision_returns_to_refinement() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        steps::update_step(
            &mut process,
            &mut ctx,
            StepId::DocumentRefinement,
            StepStatus::Completed,
            Some("v1".into()),
        )
        .unwrap();
        steps::move_to(
            &mut process,
            &mut ctx,
            StepLocation::Step(StepId::MandatoryCheckpoint),
        )
        .unwrap();

        let landed = record_human_decision(
            &mut process,
            &mut ctx,
            HumanDecision::Revise,
            Some("tighten scope".to_string()),
        )
        .unwrap();

        assert_eq!(landed, StepId::DocumentRefinement);
        let refinement = process.step(StepId::DocumentRefinement).unwrap();
        assert_eq!(refinement.status, StepStatus::InProgress);
        assert!(refinement.completed_at.is_none());
        let checkpoint = process.step(StepId::MandatoryCheckpoint).unwrap();
        assert_eq!(checkpoint.status, StepStatus::Pending);
        assert_eq!(checkpoint.documents.len(), 1);
        assert_eq!(checkpoint.documents[0].doc_type, DocumentType::CheckpointRecord);
    }

    #[test]
    fn test_decided_gate_rejects_another_decision() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        steps::move_to(
            &mut process,
            &mut ctx,
            StepLocation::Step(StepId::MandatoryCheckpoint),
        )
        .unwrap();

        record_human_decision(&mut process, &mut ctx, HumanDecision::Approve, None).unwrap();
        let again = record_human_decision(&mut process, &mut ctx, HumanDecision::Revise, None);

        assert!(matches!(again, Err(FlowError::InvalidTransition(_))));
        assert_eq!(
            process.step(StepId::MandatoryCheckpoint).unwrap().documents.len(),
            1
        );
    }

    #[test]
    fn test_agent_target_uses_previous_output() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();
        clarification::open_round(&mut process, &mut ctx).unwrap();
        submit_clarification(&mut process, &mut ctx, &all_answers(), "pm").unwrap();

        assert!(agent_target(&process).is_err());
        skip_market_research(&mut process, &mut ctx).unwrap();

        let (step, agent, input) = agent_target(&process).unwrap();
        assert_eq!(step, StepId::RequirementDesign);
        assert_eq!(agent, pf_protocol::step_models::DEMAND_MANAGER);
        // 1.2 was skipped, so the clarification summary is handed on
        assert!(input.starts_with("clarification completed"));

        record_agent_output(&mut process, &mut ctx, step, input, "PRD v1".to_string(), Vec::new())
            .unwrap();
        let design = process.step(StepId::RequirementDesign).unwrap();
        assert_eq!(design.status, StepStatus::Completed);
        assert_eq!(design.documents[0].doc_type, DocumentType::RequirementDocument);
        assert_eq!(process.current_step, StepLocation::Step(StepId::DesignChallenge));
    }
}
