//! # pf-core
//!
//! Workflow engine for product definition.
//!
//! This crate provides:
//! - The twelve-step graph and its state machine
//! - The clarification loop of step 1.1 and the document registry
//! - Per-process orchestration over a persistence adapter
//! - Agent abstraction for the steps that agents own
//! - Configuration loading from and initialization of `.product-flow/`
//!
//! ## Modules
//!
//! - [`engine`]: Pure state transformations over a process
//! - [`state`]: Process lifecycle and the `FlowManager` orchestrator
//! - [`store`]: Process persistence adapters
//! - [`agents`]: Agent trait, mock adapters and the agent registry
//! - [`config`]: Configuration loading
//! - [`init`]: Project initialization from embedded templates

pub mod agents;
pub mod config;
pub mod engine;
pub mod init;
pub mod state;
pub mod store;

pub use engine::error::{FlowError, FlowResult};
pub use state::manager::{FlowManager, OpOutcome};
