use thiserror::Error;

/// Failures of the underlying key-value store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage quota exceeded writing {key} ({needed} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage io error on {key}: {message}")]
    Io { key: String, message: String },
}

/// Everything that can go wrong in the task list. None of these are fatal;
/// each one ends up as a transient notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("task cannot be empty")]
    Validation,

    #[error("failed to persist tasks: {0}")]
    Persistence(String),

    /// The store refused a read. The stored value is left in place.
    #[error("failed to read tasks: {0}")]
    Unreadable(String),

    #[error("stored task data is corrupt: {0}")]
    CorruptState(String),
}

impl From<StorageError> for TodoError {
    fn from(err: StorageError) -> Self {
        TodoError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::Persistence(err.to_string())
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
