use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Chunk, MetadataField, MetadataFilter, ScoredChunk};

/// Repository interface for knowledge chunks and similarity search.
///
/// All read operations must tolerate an empty store. Similarity queries only
/// consider chunks that carry an embedding and rank them by cosine distance
/// ascending, breaking ties by surrogate id.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Persist a new chunk in its own atomic write.
    ///
    /// # Returns
    /// * `Ok(i64)` - The surrogate id assigned by the store
    /// * `Err(_)` - If the write fails (e.g. duplicate external id)
    async fn save(&self, chunk: &Chunk) -> DomainResult<i64>;

    /// Attach an embedding to an already stored chunk.
    async fn set_embedding(&self, id: i64, embedding: &[f32]) -> DomainResult<()>;

    async fn find_by_external_id(&self, external_id: &str) -> DomainResult<Option<Chunk>>;

    async fn find_by_metadata_field(
        &self,
        field: MetadataField,
        value: &str,
    ) -> DomainResult<Vec<Chunk>>;

    /// Chunks still lacking an embedding, oldest first.
    async fn find_without_embedding(&self, limit: usize) -> DomainResult<Vec<Chunk>>;

    /// The `k` nearest chunks to `query_vector`.
    ///
    /// When `filter` is set it is applied before ranking.
    async fn find_top_k_by_similarity(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> DomainResult<Vec<ScoredChunk>>;

    /// Same ranking as [`find_top_k_by_similarity`](Self::find_top_k_by_similarity),
    /// keeping only chunks with `cosine_similarity >= threshold`.
    async fn find_above_threshold(
        &self,
        query_vector: &[f32],
        threshold: f32,
        k: usize,
    ) -> DomainResult<Vec<ScoredChunk>>;

    async fn count(&self) -> DomainResult<u64>;

    async fn count_with_embedding(&self) -> DomainResult<u64>;
}
