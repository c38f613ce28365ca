//! RAG (Retrieval-Augmented Generation) service
//!
//! Facade over retrieval and prompt composition plus the availability gate
//! that decides whether the RAG path may be used at all.

use std::sync::Arc;

use crate::domain::models::{
    Chunk, MetadataFilter, RagConfig, RagStats, RetrievalQuery, ScoredChunk,
};
use crate::domain::ports::ChunkRepository;
use crate::services::prompt_builder::PromptBuilder;
use crate::services::retrieval::RetrievalEngine;

pub struct RagService {
    repository: Arc<dyn ChunkRepository>,
    retrieval: RetrievalEngine,
    prompts: PromptBuilder,
    config: RagConfig,
}

impl RagService {
    /// # Arguments
    /// * `repository` - Chunk store used for the availability gate and stats
    /// * `retrieval` - Engine answering similarity queries
    /// * `prompts` - Prompt composer
    /// * `config` - Retrieval settings reported by [`RagService::get_stats`]
    pub fn new(
        repository: Arc<dyn ChunkRepository>,
        retrieval: RetrievalEngine,
        prompts: PromptBuilder,
        config: RagConfig,
    ) -> Self {
        Self {
            repository,
            retrieval,
            prompts,
            config,
        }
    }

    /// True when RAG is enabled and at least one chunk has an embedding.
    pub async fn is_rag_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }

        match self.repository.count_with_embedding().await {
            Ok(count) => count > 0,
            Err(err) => {
                tracing::error!(error = %err, "error checking RAG availability");
                false
            }
        }
    }

    /// Configuration and store counts. Store errors report zero counts.
    pub async fn get_stats(&self) -> RagStats {
        let total_chunks = self.repository.count().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to count chunks");
            0
        });
        let chunks_with_embedding =
            self.repository
                .count_with_embedding()
                .await
                .unwrap_or_else(|err| {
                    tracing::error!(error = %err, "failed to count embedded chunks");
                    0
                });

        RagStats {
            enabled: self.config.enabled,
            total_chunks,
            chunks_with_embedding,
            default_top_k: self.config.default_top_k,
            similarity_threshold: self.config.similarity_threshold,
        }
    }

    pub async fn retrieve_relevant_chunks(&self, query: &str, top_k: Option<usize>) -> Vec<Chunk> {
        self.retrieval.retrieve_relevant_chunks(query, top_k).await
    }

    pub async fn retrieve_relevant_chunks_by_metadata(
        &self,
        query: &str,
        filter: MetadataFilter,
        top_k: Option<usize>,
    ) -> Vec<Chunk> {
        self.retrieval
            .retrieve_relevant_chunks_by_metadata(query, filter, top_k)
            .await
    }

    pub async fn retrieve(&self, request: &RetrievalQuery) -> Vec<ScoredChunk> {
        self.retrieval.retrieve(request).await
    }

    pub fn build_augmented_prompt(&self, query: &str, chunks: &[Chunk]) -> String {
        self.prompts.build_augmented_prompt(query, chunks)
    }

    pub fn build_fallback_prompt(&self, query: &str) -> String {
        self.prompts.build_fallback_prompt(query)
    }

    /// The prompt handed to generation for `query`.
    ///
    /// Falls back to the context-free prompt when RAG is unavailable or
    /// nothing relevant is found.
    pub async fn generate_prompt(&self, query: &str) -> String {
        if !self.is_rag_available().await {
            tracing::debug!("RAG not available, using standard prompt");
            return self.prompts.build_fallback_prompt(query);
        }

        let chunks = self.retrieval.retrieve_relevant_chunks(query, None).await;
        if chunks.is_empty() {
            tracing::debug!("no relevant chunks found, using standard prompt");
            return self.prompts.build_fallback_prompt(query);
        }

        tracing::info!(count = chunks.len(), "using RAG context");
        self.prompts.build_augmented_prompt(query, &chunks)
    }
}
