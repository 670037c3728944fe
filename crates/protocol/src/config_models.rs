//! Global configuration models for `.product-flow/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents global settings from `.product-flow/config.toml`.
///
/// # Example
///
/// ```toml
/// data_dir = ".product-flow/processes"
/// default_responder = "product-owner"
///
/// [keywords]
/// market_research = ["competitor", "market"]
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GlobalConfig {
    /// Directory holding one JSON file per process.
    #[serde(default = "default_data_dir")]
    #[ts(type = "string")]
    pub data_dir: PathBuf,

    /// Name recorded as `answeredBy` when a submission names nobody.
    #[serde(default = "default_responder")]
    pub default_responder: String,

    /// Overrides for the keyword heuristics. Empty lists keep the built-in terms.
    #[serde(default)]
    pub keywords: KeywordConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct KeywordConfig {
    #[serde(default)]
    pub market_research: Vec<String>,
    #[serde(default)]
    pub ai: Vec<String>,
    #[serde(default)]
    pub collaboration: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".product-flow/processes")
}

fn default_responder() -> String {
    "user".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_responder: default_responder(),
            keywords: KeywordConfig::default(),
        }
    }
}
