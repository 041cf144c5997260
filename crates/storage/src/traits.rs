use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::Entry;

/// The storage trait for check-in entries.
///
/// An `EntryStore` holds the whole id → entry mapping. The lifecycle layer
/// reads an entry, mutates its copy, and hands it back through [`put`];
/// stores never partially update a record.
///
/// ## Durability
///
/// `put` returns only after the change has reached the backing medium (for
/// persistent backends). A failed persist surfaces as an error and is never
/// retried by the store.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries. Concurrent `put`s must
/// not interleave their writes to the backing medium.
///
/// [`put`]: EntryStore::put
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Read one entry.
    ///
    /// Returns `Err(StorageError::EntryNotFound)` if no entry has this id.
    async fn get(&self, id: &str) -> Result<Entry, StorageError>;

    /// Insert or replace the entry stored under `entry.id`, then persist.
    async fn put(&self, entry: Entry) -> Result<(), StorageError>;

    /// All entries, newest `created_at` first (ties broken by id).
    async fn list(&self) -> Result<Vec<Entry>, StorageError>;
}

/// Sort entries newest first, the order `list` promises.
pub(crate) fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
