/// Errors from snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No snapshot is recorded for the API type.
    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// Content digest mismatch on read (the file was edited or corrupted).
    #[error("digest mismatch for {name}: expected {expected}, computed {computed}")]
    HashMismatch {
        name: String,
        expected: String,
        computed: String,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The API name cannot be used as a snapshot key.
    #[error("invalid snapshot name {0:?}")]
    InvalidName(String),

    /// The snapshot decodes but is not usable.
    #[error("corrupt snapshot {name}: {reason}")]
    CorruptSnapshot { name: String, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
