//! Process lifecycle.
//!
//! Construction of a fresh aggregate and the derived fields (status and
//! progress) that are recomputed after every mutation.

use crate::engine::clarification;
use crate::engine::error::{FlowError, FlowResult};
use crate::engine::steps::initial_steps;
use crate::engine::FlowContext;
use pf_protocol::ipc::Event;
use pf_protocol::process_models::{Process, ProcessStatus};
use pf_protocol::step_models::{StepId, StepLocation, StepStatus};

/// Create a new Process with its first clarification round already open.
///
/// # Arguments
///
/// * `ctx` - Clock, ids and keyword rules for this operation
/// * `name` - Display name of the process
/// * `requirement` - The raw product requirement text
/// * `version_id` - Opaque version reference, stored as given
/// * `project_id` - Opaque project reference, stored as given
///
/// # Errors
///
/// Returns `ValidationFailed` if `name` or `requirement` is blank.
pub fn create_process(
    ctx: &mut FlowContext<'_>,
    name: &str,
    requirement: &str,
    version_id: &str,
    project_id: &str,
) -> FlowResult<Process> {
    let name = name.trim();
    let requirement = requirement.trim();
    if name.is_empty() {
        return Err(FlowError::ValidationFailed(
            "process name must not be empty".to_string(),
        ));
    }
    if requirement.is_empty() {
        return Err(FlowError::ValidationFailed(
            "requirement must not be empty".to_string(),
        ));
    }

    let now = ctx.clock.now();
    let mut process = Process {
        id: format!("process_{}", ctx.ids.next_id()),
        name: name.to_string(),
        requirement: requirement.to_string(),
        version_id: version_id.to_string(),
        project_id: project_id.to_string(),
        status: ProcessStatus::InProgress,
        current_step: StepLocation::Step(StepId::FIRST),
        steps: initial_steps(requirement, now),
        documents: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    ctx.emit(Event::ProcessCreated {
        process_id: process.id.clone(),
        name: process.name.clone(),
    });
    clarification::open_round(&mut process, ctx)?;

    tracing::info!(process_id = %process.id, "process created");
    Ok(process)
}

/// Percentage of the twelve steps that are completed, rounded to the nearest
/// integer. Skipped steps do not count.
pub fn progress_percentage(process: &Process) -> u8 {
    let total = process.steps.len();
    if total == 0 {
        return 0;
    }
    let completed = process
        .steps
        .values()
        .filter(|s| s.status == StepStatus::Completed)
        .count();
    ((completed as f64 * 100.0) / total as f64).round() as u8
}

/// Status implied by the steps: completed once the terminal step is
/// completed, pending while nothing has started.
pub fn derive_status(process: &Process) -> ProcessStatus {
    let terminal_done = process
        .step(StepId::LAST)
        .is_some_and(|s| s.status == StepStatus::Completed);
    if terminal_done {
        ProcessStatus::Completed
    } else if process
        .steps
        .values()
        .all(|s| s.status == StepStatus::Pending)
    {
        ProcessStatus::Pending
    } else {
        ProcessStatus::InProgress
    }
}

/// Stamp `updated_at`, recompute the status and report progress.
///
/// Emits `ProcessCompleted` on the transition into `Completed`.
pub fn refresh_status(process: &mut Process, ctx: &mut FlowContext<'_>) {
    process.updated_at = ctx.clock.now();

    let previous = process.status;
    process.status = derive_status(process);
    ctx.emit(Event::ProcessStatusUpdate {
        process_id: process.id.clone(),
        status: process.status,
        progress: progress_percentage(process),
    });

    if previous != ProcessStatus::Completed && process.status == ProcessStatus::Completed {
        tracing::info!(process_id = %process.id, "process completed");
        ctx.emit(Event::ProcessCompleted {
            process_id: process.id.clone(),
        });
    }
}
