//! Flat-file JSON backend: the whole id → entry mapping lives in one document.
//!
//! The document is read once when the store opens and rewritten in full after
//! every `put`. Writes go to a sibling temp file that is renamed over the
//! target, so the document on disk is always either the old or the new
//! mapping.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::Entry;
use crate::traits::{sort_newest_first, EntryStore};
use crate::EntryMap;

/// Read the entry mapping at `path`.
///
/// A missing file yields an empty mapping. So does a file that cannot be read
/// or parsed: the content is discarded with a warning and the next save
/// overwrites it.
pub async fn load(path: &Path) -> EntryMap {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return EntryMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "entry store unreadable, starting empty");
            return EntryMap::new();
        }
    };

    match serde_json::from_slice::<EntryMap>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "entry store corrupt, starting empty");
            EntryMap::new()
        }
    }
}

/// Serialize `entries` and replace the document at `path`.
pub async fn save(path: &Path, entries: &EntryMap) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(entries)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| StorageError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "entries.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// `EntryStore` backed by a single JSON document.
pub struct JsonFileStore {
    path: PathBuf,
    /// Held for writing across the whole-document save so saves never interleave.
    entries: RwLock<EntryMap>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading whatever is already there.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path).await;
        tracing::debug!(path = %path.display(), count = entries.len(), "entry store loaded");
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently held in memory.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStore for JsonFileStore {
    async fn get(&self, id: &str) -> Result<Entry, StorageError> {
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::EntryNotFound { id: id.to_string() })
    }

    async fn put(&self, entry: Entry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let id = entry.id.clone();
        let previous = entries.insert(id.clone(), entry);

        if let Err(e) = save(&self.path, &entries).await {
            // Keep memory in step with what is on disk.
            match previous {
                Some(prev) => {
                    entries.insert(id, prev);
                }
                None => {
                    entries.remove(&id);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Entry>, StorageError> {
        let mut all: Vec<Entry> = self.entries.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }
}
