//! Retrieval engine: query text in, most similar stored chunks out.
//!
//! Retrieval never fails. A disabled configuration, an embedding failure
//! or a store error all produce an empty result.

use std::sync::Arc;

use crate::domain::models::{Chunk, MetadataFilter, RagConfig, RetrievalQuery, ScoredChunk};
use crate::domain::ports::ChunkRepository;
use crate::services::embedding_service::EmbeddingService;

pub struct RetrievalEngine {
    repository: Arc<dyn ChunkRepository>,
    embeddings: Arc<EmbeddingService>,
    enabled: bool,
    default_top_k: usize,
}

impl RetrievalEngine {
    pub fn new(
        repository: Arc<dyn ChunkRepository>,
        embeddings: Arc<EmbeddingService>,
        config: &RagConfig,
    ) -> Self {
        Self {
            repository,
            embeddings,
            enabled: config.enabled,
            default_top_k: config.default_top_k,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Top-k chunks for `query`, most similar first.
    pub async fn retrieve_relevant_chunks(&self, query: &str, top_k: Option<usize>) -> Vec<Chunk> {
        let request = RetrievalQuery {
            top_k,
            ..RetrievalQuery::new(query)
        };
        into_chunks(self.retrieve(&request).await)
    }

    /// Top-k chunks for `query` among those matching `filter`.
    pub async fn retrieve_relevant_chunks_by_metadata(
        &self,
        query: &str,
        filter: MetadataFilter,
        top_k: Option<usize>,
    ) -> Vec<Chunk> {
        let request = RetrievalQuery {
            top_k,
            ..RetrievalQuery::new(query).with_filter(filter)
        };
        into_chunks(self.retrieve(&request).await)
    }

    /// General form. With a threshold, only chunks at or above it are kept;
    /// combined with a filter the threshold applies to the filtered top-k.
    pub async fn retrieve(&self, request: &RetrievalQuery) -> Vec<ScoredChunk> {
        if !self.enabled {
            tracing::debug!("RAG is disabled");
            return Vec::new();
        }

        let top_k = request.top_k.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Vec::new();
        }

        tracing::debug!(query_len = request.text.len(), top_k, "retrieving relevant chunks");

        let Some(query_vector) = self.embeddings.embed(&request.text).await.into_vector() else {
            tracing::warn!("failed to generate embedding for query");
            return Vec::new();
        };

        let result = match (&request.metadata_filter, request.similarity_threshold) {
            (None, Some(threshold)) => {
                self.repository
                    .find_above_threshold(&query_vector, threshold, top_k)
                    .await
            }
            (filter, threshold) => self
                .repository
                .find_top_k_by_similarity(&query_vector, top_k, filter.as_ref())
                .await
                .map(|scored| {
                    scored
                        .into_iter()
                        .filter(|s| threshold.map_or(true, |t| s.similarity >= t))
                        .collect()
                }),
        };

        match result {
            Ok(chunks) => {
                tracing::debug!(count = chunks.len(), "retrieved relevant chunks");
                chunks
            }
            Err(err) => {
                tracing::error!(error = %err, "error retrieving relevant chunks");
                Vec::new()
            }
        }
    }
}

fn into_chunks(scored: Vec<ScoredChunk>) -> Vec<Chunk> {
    scored.into_iter().map(|s| s.chunk).collect()
}
