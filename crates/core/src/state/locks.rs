//! Per-process lock registry.
//!
//! A process id has an entry only while some operation holds or waits for its
//! lock. The last guard to drop removes the entry, so the registry does not
//! grow with the number of ids ever requested.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Entries = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Debug, Default)]
pub struct ProcessLocks {
    entries: Mutex<Entries>,
}

/// Exclusive access to one process id until dropped.
pub struct ProcessGuard<'a> {
    registry: &'a ProcessLocks,
    process_id: String,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ProcessLocks {
    pub fn new() -> Self {
        Self::default()
    }

    // The map is only touched in short synchronous sections, never across an await.
    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to `process_id`.
    pub async fn acquire(&self, process_id: &str) -> ProcessGuard<'_> {
        let lock = Arc::clone(
            self.entries()
                .entry(process_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        );
        // Built before waiting so a cancelled wait still cleans up.
        let mut guard = ProcessGuard {
            registry: self,
            process_id: process_id.to_string(),
            lock,
            guard: None,
        };
        guard.guard = Some(Arc::clone(&guard.lock).lock_owned().await);
        guard
    }

    /// Number of ids currently held or waited on.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Drop for ProcessGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.registry.entries();
        self.guard.take();
        // One reference in the map and one here: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            entries.remove(&self.process_id);
        }
    }
}
