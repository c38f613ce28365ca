//! Common test utilities for integration tests
//!
//! Provides a deterministic keyword embedding provider, an in-memory
//! migrated store and small builders for chunk fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ragkeeper::adapters::sqlite::{create_migrated_test_pool, SqliteChunkRepository};
use ragkeeper::cli::AppContext;
use ragkeeper::domain::models::{ChunkMetadata, Config, RagConfig, RawChunk};
use ragkeeper::domain::ports::{ChunkRepository, EmbeddingProvider};
use ragkeeper::services::{EmbeddingService, IngestionPipeline, RetrievalEngine};
use ragkeeper::{DomainError, DomainResult};

/// Dimension used by every fixture in these tests.
pub const DIM: usize = 3;

/// Texts containing this marker make [`KeywordProvider`] fail.
pub const FAIL_MARKER: &str = "FAIL";

/// Texts containing this marker get a vector with an infinite component.
pub const OVERFLOW_MARKER: &str = "OVERFLOW";

/// Embeds by keyword: "dragon", "redstone" and "farm" map to the three unit
/// axes, anything else to `[1, 1, 1]`.
#[derive(Debug, Default)]
pub struct KeywordProvider {
    calls: AtomicUsize,
    delay: Duration,
}

impl KeywordProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep `delay` (real time) inside every call.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    if text.contains("dragon") {
        vec![1.0, 0.0, 0.0]
    } else if text.contains("redstone") {
        vec![0.0, 1.0, 0.0]
    } else if text.contains("farm") {
        vec![0.0, 0.0, 1.0]
    } else {
        vec![1.0, 1.0, 1.0]
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if text.contains(FAIL_MARKER) {
            return Err(DomainError::ProviderError("simulated outage".to_string()));
        }
        if text.contains(OVERFLOW_MARKER) {
            return Ok(vec![f32::INFINITY, 0.0, 0.0]);
        }
        Ok(keyword_vector(text))
    }
}

/// RAG settings with pacing disabled.
pub fn rag_config() -> RagConfig {
    RagConfig {
        batch_size: 10,
        inter_batch_delay_ms: 0,
        item_delay_ms: 0,
        ..RagConfig::default()
    }
}

pub fn test_config() -> Config {
    let mut config = Config {
        rag: rag_config(),
        ..Config::default()
    };
    config.embedding.dimension = DIM;
    config
}

pub async fn repository() -> Arc<dyn ChunkRepository> {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test pool");
    Arc::new(SqliteChunkRepository::new(pool, DIM))
}

pub fn embedding_service(provider: Arc<dyn EmbeddingProvider>) -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::new(provider, DIM, Duration::from_secs(5)))
}

pub fn pipeline(
    repository: Arc<dyn ChunkRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    config: &RagConfig,
) -> IngestionPipeline {
    IngestionPipeline::new(repository, embedding_service(provider), config)
}

pub fn retrieval(
    repository: Arc<dyn ChunkRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    config: &RagConfig,
) -> RetrievalEngine {
    RetrievalEngine::new(repository, embedding_service(provider), config)
}

pub fn context(repository: Arc<dyn ChunkRepository>, config: Config) -> AppContext {
    AppContext::new(config, repository, Arc::new(KeywordProvider::new()))
}

pub fn raw(id: &str, text: &str) -> RawChunk {
    RawChunk {
        id: id.to_string(),
        text: text.to_string(),
        metadata: None,
    }
}

pub fn raw_in(id: &str, text: &str, collection: &str) -> RawChunk {
    RawChunk {
        metadata: Some(ChunkMetadata {
            collection: Some(collection.to_string()),
            ..Default::default()
        }),
        ..raw(id, text)
    }
}

/// `doc-1` ..= `doc-n` about dragons.
pub fn dragon_docs(n: usize) -> Vec<RawChunk> {
    (1..=n)
        .map(|i| raw(&format!("doc-{i}"), &format!("Dragon lore entry {i}")))
        .collect()
}
