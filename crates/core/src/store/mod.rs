//! Persistence adapters for the Process aggregate.
//!
//! A store is a keyed map from process id to the serialized aggregate. Loads
//! of an absent id fail with a typed [`StoreError::NotFound`]; there is no
//! separate notion of a missing collection.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use pf_protocol::process_models::Process;
use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("process not found: {0}")]
    NotFound(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid process id: {0:?}")]
    InvalidKey(String),
}

/// Read-your-writes store for whole process aggregates.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn load(&self, id: &str) -> StoreResult<Process>;

    /// Insert or replace the aggregate under `process.id`.
    async fn save(&self, process: &Process) -> StoreResult<()>;

    /// Every stored process, oldest first.
    async fn list(&self) -> StoreResult<Vec<Process>>;
}

/// Ids become file names, so only a conservative character set is accepted.
pub(crate) fn validate_key(id: &str) -> StoreResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(id.to_string()))
    }
}

pub(crate) fn sort_oldest_first(processes: &mut [Process]) {
    processes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
