//! # pf-protocol
//!
//! Data model and protocol definitions for product-flow.
//!
//! This crate defines the shared structures used for:
//! - The process aggregate, its twelve steps and their documents
//! - Clarification rounds owned by step 1.1
//! - Configuration file parsing (TOML config, Markdown agents)
//! - Operations and events exchanged with the engine
//!
//! ## Modules
//!
//! - [`step_models`]: The fixed step graph, step locations and statuses
//! - [`document_models`]: Documents, their content and clarification rounds
//! - [`process_models`]: The process aggregate
//! - [`agent_models`]: Agent configuration structures
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Operations and Events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, chrono and ts-rs
//! - TypeScript generation: all wire types derive `TS`
//! - Independent compilation: no dependencies on other product-flow crates

pub mod agent_models;
pub mod config_models;
pub mod document_models;
pub mod ipc;
pub mod process_models;
pub mod step_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use document_models::*;
pub use ipc::*;
pub use process_models::*;
pub use step_models::*;
