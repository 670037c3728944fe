//! In-memory process store.
//!
//! Aggregates are kept as JSON text so that every load is a fresh
//! deserialization, the same as with the file store.

use crate::store::{sort_oldest_first, validate_key, ProcessStore, StoreError, StoreResult};
use async_trait::async_trait;
use pf_protocol::process_models::Process;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessStore for MemoryStore {
    async fn load(&self, id: &str) -> StoreResult<Process> {
        let entries = self.entries.read().await;
        let json = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    async fn save(&self, process: &Process) -> StoreResult<()> {
        validate_key(&process.id)?;
        let json = serde_json::to_string(process)?;
        self.entries.write().await.insert(process.id.clone(), json);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Process>> {
        let entries = self.entries.read().await;
        let mut processes = entries
            .values()
            .map(|json| serde_json::from_str(json))
            .collect::<Result<Vec<Process>, _>>()?;
        sort_oldest_first(&mut processes);
        Ok(processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::empty_process;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let process = empty_process();

        store.save(&process).await.unwrap();
        let loaded = store.load(&process.id).await.unwrap();

        assert_eq!(loaded, process);
    }

    #[tokio::test]
    async fn test_memory_store_not_found() {
        let store = MemoryStore::new();

        let result = store.load("process_missing").await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "process_missing"));
    }

    #[tokio::test]
    async fn test_memory_store_save_replaces() {
        let store = MemoryStore::new();
        let mut process = empty_process();
        store.save(&process).await.unwrap();

        process.name = "Renamed".to_string();
        store.save(&process).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.load(&process.id).await.unwrap().name, "Renamed");
    }
}
