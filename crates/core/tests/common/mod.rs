//! Shared helpers for the workflow integration tests.
//!
//! - Fixtures: a manager with a fixed clock, sequential ids and an in-memory store
//! - Custom assertions over process invariants and events
//! - Mock agents that record what they were asked

pub mod assertions;
pub mod fixtures;
pub mod mock_agents;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_agents::*;
