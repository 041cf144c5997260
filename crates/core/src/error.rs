use checkin_storage::{EntryStatus, StorageError};

/// Errors produced by the entry lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Required input was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// No entry has the requested id.
    #[error("entry not found: {id}")]
    NotFound { id: String },

    /// Non-demo processing was requested. The entry has already been marked
    /// with `status` by the time this is returned.
    #[error("{message}")]
    NotImplemented {
        id: String,
        status: EntryStatus,
        message: String,
    },

    /// Writing the uploaded audio to disk failed.
    #[error("failed to store upload at {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LifecycleError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::EntryNotFound { id } => LifecycleError::NotFound { id },
            other => LifecycleError::Storage(other),
        }
    }
}
