//! In-memory chunk source, used for seeding and tests.

use async_trait::async_trait;

use crate::domain::models::RawChunk;
use crate::domain::ports::{ChunkSource, SourceError};

#[derive(Debug, Clone, Default)]
pub struct VecSource {
    chunks: Vec<RawChunk>,
}

impl VecSource {
    pub fn new(chunks: Vec<RawChunk>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl ChunkSource for VecSource {
    fn describe(&self) -> String {
        format!("memory ({} chunks)", self.chunks.len())
    }

    async fn read_all(&self) -> Result<Vec<RawChunk>, SourceError> {
        Ok(self.chunks.clone())
    }
}
