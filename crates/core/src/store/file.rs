//! JSON file process store.
//!
//! One `<id>.json` file per process under a data directory. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! target, so a reader never observes a half-written aggregate.

use crate::store::{sort_oldest_first, validate_key, ProcessStore, StoreError, StoreResult};
use async_trait::async_trait;
use pf_protocol::process_models::Process;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct JsonFileStore {
    dir: PathBuf,
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    tmp.write_all(bytes).map_err(|e| io_error(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| io_error(target, e))?;
    tmp.persist(target).map_err(|e| io_error(target, e.error))?;
    Ok(())
}

#[async_trait]
impl ProcessStore for JsonFileStore {
    async fn load(&self, id: &str) -> StoreResult<Process> {
        validate_key(id).map_err(|_| StoreError::NotFound(id.to_string()))?;
        let path = self.path_for(id);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn save(&self, process: &Process) -> StoreResult<()> {
        validate_key(&process.id)?;
        let bytes = serde_json::to_vec_pretty(process)?;
        let dir = self.dir.clone();
        let target = self.path_for(&process.id);

        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| io_error(&self.dir, std::io::Error::other(e)))??;

        tracing::debug!(process_id = %process.id, dir = %self.dir.display(), "process saved");
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Process>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut processes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| io_error(&path, e))?;
            processes.push(serde_json::from_str(&json)?);
        }

        sort_oldest_first(&mut processes);
        Ok(processes)
    }
}
