//! Directory structure and file generation for `.product-flow` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for initializing a `.product-flow` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project root where `.product-flow` will be created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.product-flow` directory.
    pub force: bool,

    /// Write only `config.toml`; the built-in agents are used as is.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a `.product-flow` directory with templates.
///
/// ```text
/// .product-flow/
/// ├── config.toml
/// ├── agents/          (unless minimal)
/// │   ├── demand-challenge.md
/// │   ├── demand-manager.md
/// │   ├── demand-refine.md
/// │   └── research-analyst.md
/// └── processes/
/// ```
///
/// Returns the paths written, relative to `.product-flow`.
///
/// # Errors
///
/// Returns an `InitError` if:
/// - The directory already exists and `force` is not set
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_product_flow_structure(options: InitOptions) -> InitResult<Vec<String>> {
    let pf_dir = options.target_dir.join(CONFIG_DIR);

    if pf_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(pf_dir));
    }

    let processes_dir = pf_dir.join("processes");
    fs::create_dir_all(&processes_dir).map_err(|source| InitError::DirectoryCreate {
        path: processes_dir,
        source,
    })?;

    let mut written = vec!["config.toml".to_string()];
    if !options.minimal {
        written.extend(list_templates("agents/"));
    }
    for template_path in &written {
        write_template_file(&pf_dir, template_path)?;
    }

    tracing::info!(dir = %pf_dir.display(), files = written.len(), "initialized project");
    Ok(written)
}

fn write_template_file(pf_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = pf_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })
}
