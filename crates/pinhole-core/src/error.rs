use thiserror::Error;

/// Result type used across the short-link engine.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Failures of the persistence medium behind [`KeyValueStore`](crate::KeyValueStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(String),
    #[error("storage serialization failed: {0}")]
    Serialization(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid validity period: {0} minutes")]
    InvalidValidity(i64),
    #[error("short code already exists: {0}")]
    CodeConflict(String),
    #[error("failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error("URL not found or expired: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
