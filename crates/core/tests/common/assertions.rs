//! Custom assertions over process invariants and emitted events.

use pf_core::engine::clarification::rounds;
use pf_protocol::document_models::RoundStatus;
use pf_protocol::ipc::Event;
use pf_protocol::process_models::Process;
use pf_protocol::step_models::{StepId, StepStatus};

/// Check every structural invariant of a process aggregate.
///
/// - the step map holds exactly the twelve identifiers
/// - `completed_at` is set iff the step is completed
/// - round numbers run 1..=n without gaps, with at most one round open
/// - the flattened document list equals the union of the step lists
#[allow(dead_code)]
pub fn assert_invariants(process: &Process) {
    let keys: Vec<StepId> = process.steps.keys().copied().collect();
    assert_eq!(keys, StepId::ALL.to_vec(), "step keys must be the fixed twelve");

    for step in process.steps.values() {
        assert_eq!(
            step.completed_at.is_some(),
            step.status == StepStatus::Completed,
            "completed_at mismatch on step {}",
            step.id
        );
        assert_eq!(
            step.clarification_rounds().is_some(),
            step.id == StepId::Clarification,
            "only step 1.1 carries clarification rounds"
        );
    }

    let all_rounds = rounds(process);
    for (index, round) in all_rounds.iter().enumerate() {
        assert_eq!(round.round_number as usize, index + 1, "round numbers must not skip");
    }
    let open = all_rounds
        .iter()
        .filter(|r| r.status == RoundStatus::InProgress)
        .count();
    assert!(open <= 1, "at most one clarification round may be open");

    let owned: usize = process.steps.values().map(|s| s.documents.len()).sum();
    assert_eq!(owned, process.documents.len());
    for document in &process.documents {
        let step = process.step(document.step_id).unwrap();
        assert!(
            step.documents.contains(document),
            "document {} differs between step and process lists",
            document.id
        );
    }
}

/// Count the events that match `pred`.
#[allow(dead_code)]
pub fn count_events(events: &[Event], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[allow(dead_code)]
pub fn assert_all_events_for(events: &[Event], process_id: &str) {
    for event in events {
        assert_eq!(event.process_id(), process_id, "unexpected event {event:?}");
    }
}
