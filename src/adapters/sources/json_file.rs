//! JSON file chunk source.
//!
//! The file holds a single JSON array of `{id, text, metadata}` objects.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::models::RawChunk;
use crate::domain::ports::{ChunkSource, SourceError};

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ChunkSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_all(&self) -> Result<Vec<RawChunk>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                origin: self.describe(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
            origin: self.describe(),
            source,
        })
    }
}
