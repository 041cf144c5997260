pub mod conformance;
mod error;
pub mod file;
mod memory;
mod record;
mod traits;

use std::collections::BTreeMap;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{
    Analysis, AudioRecord, Entry, EntryMeta, EntryStatus, NotificationRecord, ReplyRecord,
};
pub use traits::EntryStore;

/// The whole persisted document: entry id → entry record.
pub type EntryMap = BTreeMap<String, Entry>;
