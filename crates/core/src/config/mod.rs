//! Configuration loading.
//!
//! Reads global settings and agent definitions from the `.product-flow/`
//! directory of a project.

pub mod error;
pub mod loader;
pub mod models;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".product-flow";
