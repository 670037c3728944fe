//! Test fixtures for building managers and clarification answers.

use chrono::{TimeZone, Utc};
use pf_core::agents::AgentManager;
use pf_core::engine::clarification::active_round;
use pf_core::engine::clock::{FixedClock, SequentialIds};
use pf_core::store::{MemoryStore, ProcessStore};
use pf_core::FlowManager;
use pf_protocol::ipc::Event;
use pf_protocol::process_models::Process;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A manager plus the handles a test needs to drive and observe it.
#[allow(dead_code)]
pub struct TestFlow {
    pub manager: FlowManager,
    pub events: mpsc::Receiver<Event>,
    pub clock: Arc<FixedClock>,
    pub store: Arc<dyn ProcessStore>,
}

#[allow(dead_code)]
impl TestFlow {
    /// Everything emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

#[allow(dead_code)]
pub fn test_flow() -> TestFlow {
    test_flow_with(Arc::new(MemoryStore::new()), AgentManager::default())
}

pub fn test_flow_with(store: Arc<dyn ProcessStore>, agents: AgentManager) -> TestFlow {
    let (tx, rx) = mpsc::channel(1024);
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 10, 29, 6, 0, 0).unwrap(),
    ));
    let manager = FlowManager::new(Arc::clone(&store), agents, tx)
        .with_clock(clock.clone())
        .with_ids(Arc::new(SequentialIds::new()));
    TestFlow {
        manager,
        events: rx,
        clock,
        store,
    }
}

/// Build a responses map from `(question id, answer)` pairs.
#[allow(dead_code)]
pub fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(id, answer)| ((*id).to_string(), (*answer).to_string()))
        .collect()
}

/// Answer every question of the open round with a neutral text.
#[allow(dead_code)]
pub fn answer_everything(process: &Process) -> BTreeMap<String, String> {
    active_round(process)
        .map(|round| {
            round
                .questions
                .iter()
                .map(|q| (q.id.clone(), format!("Answer for {}", q.category)))
                .collect()
        })
        .unwrap_or_default()
}
