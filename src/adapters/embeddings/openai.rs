//! OpenAI embedding provider adapter.
//!
//! Talks to the `/embeddings` endpoint. Compatible with any OpenAI-compatible
//! embedding API (e.g., Azure OpenAI, local servers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind};
use crate::domain::ports::EmbeddingProvider;

/// Configuration for the OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// API key. Falls back to `OPENAI_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL for the API. Default: `https://api.openai.com/v1`.
    pub base_url: String,
    /// Embedding model. Default: `text-embedding-3-small`.
    pub model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Request timeout in seconds. Default: 30.
    pub timeout_secs: u64,
}

impl Default for OpenAiEmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: EmbeddingProviderKind::OpenAi.default_base_url().to_string(),
            model: EmbeddingProviderKind::OpenAi.default_model().to_string(),
            dimension: 1536,
            timeout_secs: 30,
        }
    }
}

impl From<&EmbeddingConfig> for OpenAiEmbeddingConfig {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.resolved_base_url(),
            model: config.resolved_model(),
            dimension: config.dimension,
            timeout_secs: config.timeout_secs,
        }
    }
}

impl OpenAiEmbeddingConfig {
    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DomainError::ProviderError(
                    "OpenAI API key not set. Set OPENAI_API_KEY env var or configure embedding.api_key."
                        .to_string(),
                )
            })
    }
}

/// OpenAI embedding provider.
pub struct OpenAiEmbeddingProvider {
    config: OpenAiEmbeddingConfig,
    client: reqwest::Client,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: OpenAiEmbeddingConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    async fn call_embeddings_api(&self, text: &str) -> DomainResult<Vec<f32>> {
        let api_key = self.config.get_api_key()?;
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let request_body = EmbeddingsRequest {
            model: &self.config.model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::ProviderError(format!(
                "Embedding API returned {status}: {body}"
            )));
        }

        let result: EmbeddingsResponse = response.json().await.map_err(|e| {
            DomainError::SerializationError(format!("Failed to parse embedding response: {e}"))
        })?;

        Ok(result
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .unwrap_or_default())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// An empty `data` array yields an empty vector, which callers treat as
    /// "no embedding" rather than a transport failure.
    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        self.call_embeddings_api(text).await
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
