//! Initialization of a project's `.product-flow` directory.
//!
//! Writes the global configuration and the agent definitions from embedded
//! templates.
//!
//! # Example
//!
//! ```no_run
//! use pf_core::init::{generate_product_flow_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_product_flow_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_product_flow_structure, InitOptions};
pub use templates::{get_template, list_templates};
