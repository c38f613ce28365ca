//! Embedding provider adapters.

pub mod gemini;
pub mod openai;

pub use gemini::{GeminiEmbeddingConfig, GeminiEmbeddingProvider};
pub use openai::{OpenAiEmbeddingConfig, OpenAiEmbeddingProvider};

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind};
use crate::domain::ports::{EmbeddingProvider, NullEmbeddingProvider};

/// Build the configured provider. Selection happens once, at startup.
pub fn build_provider(config: &EmbeddingConfig) -> DomainResult<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::Gemini => {
            Arc::new(GeminiEmbeddingProvider::new(GeminiEmbeddingConfig::from(config))?)
        }
        EmbeddingProviderKind::OpenAi => {
            Arc::new(OpenAiEmbeddingProvider::new(OpenAiEmbeddingConfig::from(config))?)
        }
        EmbeddingProviderKind::Null => Arc::new(NullEmbeddingProvider::new()),
    };

    tracing::debug!(
        provider = provider.name(),
        model = %config.resolved_model(),
        dimension = provider.dimension(),
        "embedding provider selected"
    );
    Ok(provider)
}
