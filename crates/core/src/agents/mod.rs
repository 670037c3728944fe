//! Agent abstraction and management.
//!
//! Agents produce step outputs and documents as a stream of events. The
//! engine never inspects their content; it only records what they yield.

pub mod adapters;
pub mod base;
pub mod manager;

pub use adapters::MockAgent;
pub use base::{Agent, AgentError, AgentEvent, ExecutionContext};
pub use manager::{AgentManager, AgentOutput};
