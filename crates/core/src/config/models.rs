//! Unified application configuration.

use pf_protocol::agent_models::Agent;
use pf_protocol::config_models::GlobalConfig;

/// Configuration loaded from the `.product-flow/` directory.
///
/// - `config.toml`: global settings
/// - `agents/*.md`: agent definitions
///
/// # Example
///
/// ```rust,no_run
/// use pf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Processes live in {}", config.global.data_dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub global: GlobalConfig,

    /// Agent definitions, sorted by name.
    pub agents: Vec<Agent>,
}
