//! Per-entry async locks.
//!
//! Mutating lifecycle operations hold the lock for their entry id from the
//! first read to the last write, so two requests against the same entry run
//! one after the other. Slots are dropped from the table once nobody holds or
//! waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;
type Table = Arc<Mutex<HashMap<String, Slot>>>;

#[derive(Default)]
pub struct EntryLocks {
    table: Table,
}

/// Held while an entry is being mutated. Releases on drop.
pub struct EntryGuard {
    id: String,
    slot: Slot,
    guard: Option<OwnedMutexGuard<()>>,
    table: Table,
}

impl EntryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to entry `id`.
    pub async fn lock(&self, id: &str) -> EntryGuard {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(id.to_string()).or_default().clone()
        };
        let guard = slot.clone().lock_owned().await;
        EntryGuard {
            id: id.to_string(),
            slot,
            guard: Some(guard),
            table: self.table.clone(),
        }
    }

    /// Number of ids with a live slot.
    pub fn active(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one here: nobody else is waiting.
        if Arc::strong_count(&self.slot) == 2 {
            table.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn slot_is_removed_after_release() {
        let locks = EntryLocks::new();
        {
            let _g = locks.lock("a").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn second_holder_waits_for_the_first() {
        let locks = Arc::new(EntryLocks::new());
        let first = locks.lock("a").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn different_ids_do_not_block() {
        let locks = EntryLocks::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b"))
            .await
            .expect("lock on b should not wait for a");
        assert_eq!(locks.active(), 2);
    }
}
