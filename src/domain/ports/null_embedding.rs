//! Null embedding provider implementation.
//!
//! Selected when no embedding backend is configured. Every request yields an
//! empty vector, which the embedding service reports as `NoEmbedding`.

use async_trait::async_trait;

use super::embedding::EmbeddingProvider;
use crate::domain::errors::DomainResult;

/// A no-op embedding provider that returns empty vectors.
#[derive(Debug, Clone, Default)]
pub struct NullEmbeddingProvider;

impl NullEmbeddingProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    fn name(&self) -> &'static str {
        "null"
    }

    fn dimension(&self) -> usize {
        0
    }

    async fn embed(&self, _text: &str) -> DomainResult<Vec<f32>> {
        Ok(Vec::new())
    }
}
