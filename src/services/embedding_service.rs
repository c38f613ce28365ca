//! Embedding service: the contract layer in front of a provider.
//!
//! Validates and truncates input, bounds each provider call with a timeout,
//! checks the returned dimension, and folds every error into an
//! [`EmbeddingOutcome`]. Nothing raised by a provider escapes this type.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::{
    to_vector_literal, EmbeddingConfig, EmbeddingOutcome, MAX_EMBEDDING_INPUT_CHARS,
};
use crate::domain::ports::EmbeddingProvider;
use crate::infrastructure::logging::scrub_secrets;

pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    timeout: Duration,
}

impl EmbeddingService {
    /// # Arguments
    /// * `provider` - Backend performing the remote call
    /// * `dimension` - Length every accepted vector must have
    /// * `timeout` - Upper bound on a single provider call
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimension: usize, timeout: Duration) -> Self {
        Self {
            provider,
            dimension,
            timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &EmbeddingConfig) -> Self {
        Self::new(
            provider,
            config.dimension,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Provider name for diagnostics.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Dimension every returned vector is checked against.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed one text.
    ///
    /// Blank input is rejected locally without calling the provider. Input
    /// longer than [`MAX_EMBEDDING_INPUT_CHARS`] is cut at that many chars.
    pub async fn embed(&self, text: &str) -> EmbeddingOutcome {
        if text.trim().is_empty() {
            tracing::warn!("empty text provided for embedding generation");
            return EmbeddingOutcome::NoEmbedding("blank input".to_string());
        }

        let input = truncate_chars(text, MAX_EMBEDDING_INPUT_CHARS);

        let result = tokio::time::timeout(self.timeout, self.provider.embed(input)).await;

        let outcome = match result {
            Err(_) => EmbeddingOutcome::Fault(format!(
                "embedding request timed out after {}s",
                self.timeout.as_secs_f32()
            )),
            Ok(Err(err)) => EmbeddingOutcome::Fault(scrub_secrets(&err.to_string())),
            Ok(Ok(values)) if values.is_empty() => {
                EmbeddingOutcome::NoEmbedding("provider returned no embedding values".to_string())
            }
            Ok(Ok(values)) if values.len() != self.dimension => {
                EmbeddingOutcome::NoEmbedding(format!(
                    "expected {} dimensions, got {}",
                    self.dimension,
                    values.len()
                ))
            }
            Ok(Ok(values)) if values.iter().any(|v| !v.is_finite()) => {
                EmbeddingOutcome::NoEmbedding("provider returned non-finite values".to_string())
            }
            Ok(Ok(values)) => EmbeddingOutcome::Embedded(values),
        };

        match &outcome {
            EmbeddingOutcome::Embedded(values) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    dimension = values.len(),
                    "generated embedding"
                );
            }
            EmbeddingOutcome::NoEmbedding(reason) => {
                tracing::warn!(provider = self.provider.name(), %reason, "no embedding produced");
            }
            EmbeddingOutcome::Fault(detail) => {
                tracing::error!(provider = self.provider.name(), error = %detail, "failed to generate embedding");
            }
        }

        outcome
    }

    /// Embed several texts, one provider call at a time, in input order.
    pub async fn embed_many<S: AsRef<str>>(&self, texts: &[S]) -> Vec<EmbeddingOutcome> {
        let mut outcomes = Vec::with_capacity(texts.len());
        for text in texts {
            outcomes.push(self.embed(text.as_ref()).await);
        }
        outcomes
    }

    /// Render a vector as `[0.1,0.2,...]`; `None` for an empty vector.
    pub fn to_vector_literal(embedding: &[f32]) -> Option<String> {
        to_vector_literal(embedding)
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
