use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::Entry;
use crate::traits::{sort_newest_first, EntryStore};
use crate::EntryMap;

/// Non-persistent `EntryStore`. Everything is lost when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<EntryMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Entry, StorageError> {
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::EntryNotFound { id: id.to_string() })
    }

    async fn put(&self, entry: Entry) -> Result<(), StorageError> {
        self.entries.write().await.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Entry>, StorageError> {
        let mut all: Vec<Entry> = self.entries.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }
}
