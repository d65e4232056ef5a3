use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenError {
    #[error("original url must not be empty")]
    EmptyUrl,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
