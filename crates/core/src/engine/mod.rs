//! Workflow engine.
//!
//! The engine is a set of pure state transformations over a loaded
//! [`Process`](pf_protocol::process_models::Process). Every mutation takes a
//! [`FlowContext`] that supplies time, ids and keyword rules, and collects the
//! events the mutation produced. Persistence and locking are layered on top
//! by [`crate::state::manager::FlowManager`].

pub mod clarification;
pub mod clock;
pub mod documents;
pub mod error;
pub mod heuristics;
pub mod pipeline;
pub mod steps;

use crate::engine::clock::{Clock, IdGenerator};
use crate::engine::heuristics::KeywordRules;
use pf_protocol::ipc::Event;

/// Collaborators and event buffer for a single engine operation.
pub struct FlowContext<'a> {
    pub clock: &'a dyn Clock,
    pub ids: &'a dyn IdGenerator,
    pub rules: &'a KeywordRules,
    events: Vec<Event>,
}

impl<'a> FlowContext<'a> {
    pub fn new(clock: &'a dyn Clock, ids: &'a dyn IdGenerator, rules: &'a KeywordRules) -> Self {
        Self {
            clock,
            ids,
            rules,
            events: Vec::new(),
        }
    }

    /// Buffer an event. Events are only published once the operation's
    /// result has been saved.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
