//! Embedded template files for `.product-flow` initialization.
//!
//! The workspace `templates/` directory is embedded at compile time with
//! `rust-embed`; with `debug-embed` the files are still read from the binary
//! in debug builds.

use rust_embed::RustEmbed;

/// Embedded template files.
///
/// `CARGO_MANIFEST_DIR` is `crates/core`, so `../../templates` is the
/// workspace root `templates/`.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path relative to the templates root.
///
/// # Example
/// ```
/// use pf_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("data_dir ="));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files under `prefix`, sorted.
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_protocol::step_models::{
        DEMAND_CHALLENGE, DEMAND_MANAGER, DEMAND_REFINE, RESEARCH_ANALYST,
    };

    #[test]
    fn test_get_config_template() {
        let content = get_template("config.toml").expect("config.toml should be embedded");
        assert!(content.contains("data_dir ="));
        assert!(content.contains("[keywords]"));
    }

    #[test]
    fn test_config_template_parses() {
        let content = get_template("config.toml").expect("config.toml should be embedded");
        let config: pf_protocol::config_models::GlobalConfig =
            toml::from_str(&content).expect("template should be valid TOML");
        assert_eq!(config, pf_protocol::config_models::GlobalConfig::default());
    }

    #[test]
    fn test_agent_templates_cover_graph_agents() {
        let agents = list_templates("agents/");
        for name in [DEMAND_MANAGER, RESEARCH_ANALYST, DEMAND_CHALLENGE, DEMAND_REFINE] {
            let path = format!("agents/{name}.md");
            assert!(agents.contains(&path), "missing {path}");
            let content = get_template(&path).expect("listed template should exist");
            assert!(content.contains(&format!("name: {name}")));
        }
    }

    #[test]
    fn test_get_nonexistent_template() {
        assert!(get_template("pipelines/simple-task.yaml").is_none());
    }
}
