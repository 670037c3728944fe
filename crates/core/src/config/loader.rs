//! Configuration file loader for the `.product-flow/` directory.
//!
//! - `config.toml`: global settings
//! - `agents/*.md`: agent definitions with YAML front matter

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use crate::config::CONFIG_DIR;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use pf_protocol::agent_models::Agent;
use pf_protocol::config_models::GlobalConfig;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Loads all configuration from the `.product-flow/` directory under `root`.
///
/// Missing directories or files fall back to defaults rather than failing.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - `config.toml` or an agent's front matter has invalid syntax
/// - Two agent files declare the same name
/// - An agent lists a step that another agent or a human gate owns
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let pf_dir = root.join(CONFIG_DIR);

    if !pf_dir.exists() {
        tracing::debug!(dir = %pf_dir.display(), "no configuration directory, using defaults");
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&pf_dir)?;
    let agents = load_agents(&pf_dir)?;

    Ok(AppConfig { global, agents })
}

fn load_global_config(pf_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = pf_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

fn load_agents(pf_dir: &Path) -> ConfigResult<Vec<Agent>> {
    let agents_dir = pf_dir.join("agents");

    if !agents_dir.exists() {
        return Ok(Vec::new());
    }

    let matter = Matter::<YAML>::new();
    let mut seen = HashSet::new();
    let mut agents = Vec::new();

    for entry in WalkDir::new(&agents_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: agents_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let result = matter.parse(&content);
        let mut agent: Agent = result
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: format!("Failed to deserialize front matter: {e}"),
            })?;

        if !seen.insert(agent.name.clone()) {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("duplicate agent name '{}'", agent.name),
            });
        }

        if let Some(step) = agent.steps.iter().find(|s| s.agent() != Some(agent.name.as_str())) {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("agent '{}' does not own step {step}", agent.name),
            });
        }

        agent.system_prompt = result.content;
        agents.push(agent);
    }

    agents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(agents)
}
