//! Domain errors for the ragkeeper pipeline.

use thiserror::Error;

/// Domain-level errors raised by ports and adapters.
///
/// Read paths (retrieval, availability, stats) never surface these to their
/// callers; they are logged and degraded to empty results instead.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Chunk not found: {0}")]
    ChunkNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Embedding provider error: {0}")]
    ProviderError(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its message, which may carry a key.
        DomainError::ProviderError(err.without_url().to_string())
    }
}
