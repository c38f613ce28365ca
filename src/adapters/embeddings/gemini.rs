//! Google Gemini embedding provider adapter.
//!
//! Calls `POST {base}/v1beta/models/{model}:embedContent?key=...` with a
//! single-part content body and reads `embedding.values` from the reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind, DEFAULT_EMBEDDING_DIMENSION};
use crate::domain::ports::EmbeddingProvider;

/// Configuration for the Gemini embedding provider.
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingConfig {
    /// API key. Falls back to `GEMINI_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL for the API. Default: `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// Embedding model. Default: `text-embedding-004`.
    pub model: String,
    /// Expected embedding dimension. Default: 768.
    pub dimension: usize,
    /// Request timeout in seconds. Default: 30.
    pub timeout_secs: u64,
}

impl Default for GeminiEmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: EmbeddingProviderKind::Gemini.default_base_url().to_string(),
            model: EmbeddingProviderKind::Gemini.default_model().to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            timeout_secs: 30,
        }
    }
}

impl From<&EmbeddingConfig> for GeminiEmbeddingConfig {
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

impl GeminiEmbeddingConfig {
    fn get_api_key(&self) -> DomainResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::ProviderError(
                    "Gemini API key not set. Set GEMINI_API_KEY env var or configure embedding.api_key."
                        .to_string(),
                )
            })
    }
}

/// Gemini embedding provider.
pub struct GeminiEmbeddingProvider {
    config: GeminiEmbeddingConfig,
    client: reqwest::Client,
}

impl GeminiEmbeddingProvider {
    pub fn new(config: GeminiEmbeddingConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:embedContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// A reply without `embedding.values` yields an empty vector.
    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let api_key = self.config.get_api_key()?;
        let body = EmbedContentRequest {
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::ProviderError(format!(
                "Gemini embedding API returned {status}: {body}"
            )));
        }

        let reply: EmbedContentResponse = response.json().await.map_err(|e| {
            DomainError::SerializationError(format!(
                "Failed to parse Gemini embedding response: {}",
                e.without_url()
            ))
        })?;

        let values = reply.embedding.map(|e| e.values).unwrap_or_default();
        tracing::debug!(dimension = values.len(), "gemini embedding received");
        Ok(values)
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    #[serde(default)]
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> GeminiEmbeddingConfig {
        GeminiEmbeddingConfig {
            api_key: Some("AIzaTestKey".to_string()),
            base_url: server.url(),
            dimension: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = GeminiEmbeddingConfig::default();
        assert_eq!(config.model, "text-embedding-004");
        assert_eq!(config.dimension, 768);
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_config_from_embedding_config() {
        let embedding = EmbeddingConfig {
            base_url: Some("http://localhost:9999".to_string()),
            ..Default::default()
        };
        let config = GeminiEmbeddingConfig::from(&embedding);
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.model, "text-embedding-004");
    }

    #[test]
    fn test_api_key_missing() {
        temp_env::with_var_unset("GEMINI_API_KEY", || {
            let config = GeminiEmbeddingConfig::default();
            assert!(config.get_api_key().is_err());
        });
    }

    #[test]
    fn test_api_key_from_env() {
        temp_env::with_var("GEMINI_API_KEY", Some("AIzaFromEnv"), || {
            let config = GeminiEmbeddingConfig::default();
            assert_eq!(config.get_api_key().unwrap(), "AIzaFromEnv");
        });
    }

    #[tokio::test]
    async fn test_embed_posts_content_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/text-embedding-004:embedContent")
            .match_query(Matcher::UrlEncoded("key".into(), "AIzaTestKey".into()))
            .match_body(Matcher::Json(serde_json::json!({
                "content": {"parts": [{"text": "Which mod adds dragons?"}]}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":{"values":[0.5,-0.25,1.0]}}"#)
            .create_async()
            .await;

        let provider = GeminiEmbeddingProvider::new(config_for(&server)).unwrap();
        let vector = provider.embed("Which mod adds dragons?").await.unwrap();

        assert_eq!(vector, vec![0.5, -0.25, 1.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_values_yield_empty_vector() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/text-embedding-004:embedContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"embedding":{}}"#)
            .create_async()
            .await;

        let provider = GeminiEmbeddingProvider::new(config_for(&server)).unwrap();
        assert!(provider.embed("text").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/text-embedding-004:embedContent")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let provider = GeminiEmbeddingProvider::new(config_for(&server)).unwrap();
        let err = provider.embed("text").await.unwrap_err();

        assert!(matches!(err, DomainError::ProviderError(ref m) if m.contains("500")));
        assert!(!err.to_string().contains("AIzaTestKey"));
    }
}
