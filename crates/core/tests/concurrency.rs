//! Per-process serialization under a multi-threaded runtime.

mod common;

use common::*;
use pf_protocol::step_models::{StepId, StepLocation, StepStatus};
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_processes_progress_independently() {
    let TestFlow {
        manager,
        events: _events,
        ..
    } = test_flow();
    let manager = Arc::new(manager);

    let mut tasks = JoinSet::new();
    for n in 0..8 {
        let manager = Arc::clone(&manager);
        tasks.spawn(async move {
            let process = manager
                .create(&format!("Process {n}"), "Optimize login", "v1", "p1")
                .await
                .unwrap();
            let (process, _) = manager
                .submit_clarification(&process.id, &answer_everything(&process), None)
                .await
                .unwrap();
            process
        });
    }

    let mut ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        let process = result.unwrap();
        assert_eq!(
            process.current_step,
            StepLocation::Judgment(StepId::MarketResearch)
        );
        ids.push(process.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);

    let stored = manager.list().await.unwrap();
    assert_eq!(stored.len(), 8);
    for process in &stored {
        assert_invariants(process);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_process_updates_are_not_lost() {
    let TestFlow {
        manager,
        events: _events,
        ..
    } = test_flow();
    let manager = Arc::new(manager);
    let process = manager
        .create("Login UX", "Optimize login", "v1", "p1")
        .await
        .unwrap();

    // every step except the one at the pointer, all racing on one aggregate
    let targets: Vec<StepId> = StepId::ALL
        .iter()
        .copied()
        .filter(|id| *id != StepId::Clarification)
        .collect();

    let mut tasks = JoinSet::new();
    for step in targets.clone() {
        let manager = Arc::clone(&manager);
        let id = process.id.clone();
        tasks.spawn(async move {
            manager
                .update_step(
                    &id,
                    step.as_str(),
                    StepStatus::Completed,
                    Some(format!("done {step}")),
                )
                .await
                .unwrap();
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    let process = manager.get(&process.id).await.unwrap();
    for step in targets {
        let stored = process.step(step).unwrap();
        assert_eq!(stored.status, StepStatus::Completed, "lost update on {step}");
        assert_eq!(stored.output, Some(format!("done {step}")));
    }
    assert_eq!(process.current_step, StepLocation::Step(StepId::Clarification));
    assert_invariants(&process);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_submissions_apply_once() {
    let TestFlow {
        manager,
        events: _events,
        ..
    } = test_flow();
    let manager = Arc::new(manager);
    let process = manager
        .create("Login UX", "Optimize login", "v1", "p1")
        .await
        .unwrap();
    let responses = answer_everything(&process);

    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let manager = Arc::clone(&manager);
        let id = process.id.clone();
        let responses = responses.clone();
        tasks.spawn(async move { manager.submit_clarification(&id, &responses, None).await });
    }

    let mut accepted = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);

    let process = manager.get(&process.id).await.unwrap();
    assert_eq!(pf_core::engine::clarification::rounds(&process).len(), 1);
    assert_invariants(&process);
}
