//! Embedding provider port for semantic vector generation.
//!
//! Providers only perform the remote call. Input validation, truncation,
//! timeouts and the conversion of errors into
//! [`EmbeddingOutcome`](crate::domain::models::EmbeddingOutcome) live in
//! [`EmbeddingService`](crate::services::EmbeddingService).

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "openai", "null").
    fn name(&self) -> &'static str;

    /// Embedding dimension for this provider/model.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>>;
}
