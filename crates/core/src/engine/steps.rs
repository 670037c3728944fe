//! Step state machine.
//!
//! Owns the construction of the fixed step map, the raw status-update
//! primitive, and pointer movement along the graph. Legality checks for
//! branch-specific operations live in [`crate::engine::pipeline`].

use crate::engine::error::{FlowError, FlowResult};
use crate::engine::FlowContext;
use chrono::{DateTime, Utc};
use pf_protocol::ipc::Event;
use pf_protocol::process_models::{Process, Step, StepExtension};
use pf_protocol::step_models::{StepId, StepLocation, StepStatus};
use std::collections::BTreeMap;

/// Build the twelve steps of a new process.
///
/// Step 1.1 starts `InProgress` with the requirement as input and an empty
/// clarification extension; every other step is `Pending`.
pub fn initial_steps(requirement: &str, now: DateTime<Utc>) -> BTreeMap<StepId, Step> {
    StepId::ALL
        .iter()
        .map(|&id| {
            let first = id == StepId::FIRST;
            let step = Step {
                id,
                name: id.name().to_string(),
                status: if first {
                    StepStatus::InProgress
                } else {
                    StepStatus::Pending
                },
                started_at: first.then_some(now),
                completed_at: None,
                input: first.then(|| requirement.to_string()),
                output: None,
                agent_name: id.agent().map(str::to_string),
                documents: Vec::new(),
                extension: first.then(|| StepExtension::Clarification {
                    clarification_rounds: Vec::new(),
                }),
            };
            (id, step)
        })
        .collect()
}

/// Raw status update for one step. Never moves `current_step`.
///
/// - `InProgress` stamps `started_at` if unset.
/// - `Completed` stamps `completed_at` and records `output`.
/// - Any other status is stored as given; leaving `Completed` clears the
///   completion stamp and output.
pub fn update_step(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    step_id: StepId,
    status: StepStatus,
    output: Option<String>,
) -> FlowResult<()> {
    let now = ctx.clock.now();
    let step = process
        .step_mut(step_id)
        .ok_or_else(|| FlowError::UnknownStep(step_id.to_string()))?;

    step.status = status;
    match status {
        StepStatus::Completed => {
            step.completed_at = Some(now);
            step.output = Some(output.unwrap_or_default());
        }
        StepStatus::InProgress => {
            if step.started_at.is_none() {
                step.started_at = Some(now);
            }
            step.completed_at = None;
            step.output = None;
        }
        StepStatus::Pending | StepStatus::Skipped => {
            step.completed_at = None;
            step.output = None;
        }
    }

    tracing::info!(process_id = %process.id, step = %step_id, ?status, "step status updated");
    ctx.emit(Event::StepStatusUpdate {
        process_id: process.id.clone(),
        step_id,
        status,
    });
    Ok(())
}

/// Fail unless the pointer sits exactly on `step_id`.
pub fn ensure_current(process: &Process, step_id: StepId) -> FlowResult<()> {
    if process.current_step == StepLocation::Step(step_id) {
        Ok(())
    } else {
        tracing::warn!(
            process_id = %process.id,
            requested = %step_id,
            current = %process.current_step,
            "rejected transition for a step that is not current"
        );
        Err(FlowError::invalid_transition(format!(
            "step {step_id} is not the current step ({})",
            process.current_step
        )))
    }
}

/// Where the pointer goes after `from` completes.
///
/// Completing 1.1 leads to the market research judgment; the terminal step
/// has no successor.
pub fn next_location(from: StepId) -> Option<StepLocation> {
    match from {
        StepId::Clarification => Some(StepLocation::Judgment(StepId::MarketResearch)),
        other => other.next().map(StepLocation::Step),
    }
}

/// Move the pointer. Entering a plain step that is not yet running marks it
/// `InProgress`.
pub fn move_to(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    location: StepLocation,
) -> FlowResult<()> {
    process.current_step = location;
    ctx.emit(Event::CurrentStepChanged {
        process_id: process.id.clone(),
        current_step: location,
    });

    if let StepLocation::Step(step_id) = location {
        let status = process
            .step(step_id)
            .map(|s| s.status)
            .ok_or_else(|| FlowError::UnknownStep(step_id.to_string()))?;
        if status != StepStatus::InProgress {
            update_step(process, ctx, step_id, StepStatus::InProgress, None)?;
        }
    }
    Ok(())
}

/// Complete `step_id` and advance the pointer linearly.
///
/// At the terminal step the pointer stays put.
pub fn complete_and_advance(
    process: &mut Process,
    ctx: &mut FlowContext<'_>,
    step_id: StepId,
    output: String,
) -> FlowResult<()> {
    update_step(process, ctx, step_id, StepStatus::Completed, Some(output))?;
    if let Some(next) = next_location(step_id) {
        move_to(process, ctx, next)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{context_parts, empty_process};

    #[test]
    fn test_initial_steps() {
        let now = Utc::now();
        let steps = initial_steps("Build a thing", now);

        assert_eq!(steps.keys().copied().collect::<Vec<_>>(), StepId::ALL.to_vec());
        let first = &steps[&StepId::Clarification];
        assert_eq!(first.status, StepStatus::InProgress);
        assert_eq!(first.started_at, Some(now));
        assert_eq!(first.input.as_deref(), Some("Build a thing"));
        assert!(first.clarification_rounds().is_some());

        for step in steps.values().filter(|s| s.id != StepId::Clarification) {
            assert_eq!(step.status, StepStatus::Pending);
            assert!(step.started_at.is_none());
            assert!(step.extension.is_none());
        }
        assert!(steps[&StepId::HumanEvaluation].agent_name.is_none());
    }

    #[test]
    fn test_update_step_stamps() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();

        update_step(&mut process, &mut ctx, StepId::DesignChallenge, StepStatus::InProgress, None)
            .unwrap();
        let started = process.step(StepId::DesignChallenge).unwrap().started_at;
        assert!(started.is_some());

        parts.clock.advance(chrono::Duration::minutes(5));
        update_step(
            &mut process,
            &mut ctx,
            StepId::DesignChallenge,
            StepStatus::Completed,
            Some("challenged".to_string()),
        )
        .unwrap();

        let step = process.step(StepId::DesignChallenge).unwrap();
        assert_eq!(step.started_at, started);
        assert!(step.completed_at.is_some());
        assert_eq!(step.output.as_deref(), Some("challenged"));
        // the raw primitive never moves the pointer
        assert_eq!(process.current_step, StepLocation::Step(StepId::Clarification));
    }

    #[test]
    fn test_started_at_is_never_reset() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();

        update_step(&mut process, &mut ctx, StepId::DocumentRefinement, StepStatus::InProgress, None)
            .unwrap();
        let first_start = process.step(StepId::DocumentRefinement).unwrap().started_at;

        parts.clock.advance(chrono::Duration::hours(1));
        update_step(&mut process, &mut ctx, StepId::DocumentRefinement, StepStatus::Completed, None)
            .unwrap();
        update_step(&mut process, &mut ctx, StepId::DocumentRefinement, StepStatus::InProgress, None)
            .unwrap();

        let step = process.step(StepId::DocumentRefinement).unwrap();
        assert_eq!(step.started_at, first_start);
        assert!(step.completed_at.is_none());
        assert!(step.output.is_none());
    }

    #[test]
    fn test_any_step_can_be_skipped_directly() {
        let mut process = empty_process();
        let parts = context_parts();
        let mut ctx = parts.context();

        update_step(
            &mut process,
            &mut ctx,
            StepId::DocumentRefinement,
            StepStatus::Completed,
            Some("refined".to_string()),
        )
        .unwrap();
        update_step(&mut process, &mut ctx, StepId::DocumentRefinement, StepStatus::Skipped, None)
            .unwrap();

        let step = process.step(StepId::DocumentRefinement).unwrap();
        assert_eq!(step.status, StepStatus::Skipped);
        assert!(step.completed_at.is_none());
        assert!(step.output.is_none());
    }

    #[test]
    fn test_next_location() {
        assert_eq!(
            next_location(StepId::Clarification),
            Some(StepLocation::Judgment(StepId::MarketResearch))
        );
        assert_eq!(
            next_location(StepId::DocumentRevision),
            Some(StepLocation::Step(StepId::DivergenceCheck))
        );
        assert_eq!(next_location(StepId::MandatoryCheckpoint), None);
    }

    #[test]
    fn test_ensure_current() {
        let process = empty_process();
        assert!(ensure_current(&process, StepId::Clarification).is_ok());
        assert!(matches!(
            ensure_current(&process, StepId::RequirementDesign),
            Err(FlowError::InvalidTransition(_))
        ));
    }
}
