/// All errors that can be returned by an EntryStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No entry is stored under the given id.
    #[error("entry not found: {id}")]
    EntryNotFound { id: String },

    /// Reading or writing the backing document failed.
    #[error("storage i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The entry mapping could not be serialized.
    #[error("failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
