//! Bulk chunk source port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::RawChunk;

/// Failure to read a bulk source as a whole.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read chunk source {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed chunk source {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A sequentially readable list of raw chunk definitions, consumed once per
/// ingestion run.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Short description used in logs (file path, "memory", ...).
    fn describe(&self) -> String;

    /// Read every definition, preserving source order.
    async fn read_all(&self) -> Result<Vec<RawChunk>, SourceError>;
}
