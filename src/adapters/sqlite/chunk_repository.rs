//! SQLite implementation of the ChunkRepository.
//!
//! Embeddings are stored as little-endian `f32` BLOBs. Similarity ranking is
//! an exact scan in Rust over every embedded row that passes the filter.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    cosine_similarity, Chunk, ChunkMetadata, MetadataField, MetadataFilter, ScoredChunk,
};
use crate::domain::ports::ChunkRepository;

const SELECT_COLUMNS: &str = "id, external_id, text, embedding, collection, item_name, \
     item_version, category, doc_type, language, created_at";

#[derive(Clone)]
pub struct SqliteChunkRepository {
    pool: SqlitePool,
    dimension: usize,
}

impl SqliteChunkRepository {
    /// # Arguments
    /// * `pool` - Migrated SQLite pool
    /// * `dimension` - Required length of every stored embedding
    pub fn new(pool: SqlitePool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, embedding: &[f32]) -> DomainResult<()> {
        if embedding.len() == self.dimension {
            Ok(())
        } else {
            Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            })
        }
    }

    /// Serialize embedding vector to bytes for storage
    pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding vector from bytes
    pub fn bytes_to_embedding(bytes: &[u8]) -> DomainResult<Vec<f32>> {
        if bytes.len() % 4 != 0 {
            return Err(DomainError::SerializationError(format!(
                "invalid embedding byte length {}",
                bytes.len()
            )));
        }

        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    async fn fetch_embedded(&self, filter: Option<&MetadataFilter>) -> DomainResult<Vec<Chunk>> {
        let rows: Vec<ChunkRow> = match filter {
            Some(filter) => {
                let sql = format!(
                    "SELECT {SELECT_COLUMNS} FROM rag_chunks \
                     WHERE embedding IS NOT NULL AND {} = ?",
                    filter.field.column()
                );
                sqlx::query_as(&sql)
                    .bind(&filter.value)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql =
                    format!("SELECT {SELECT_COLUMNS} FROM rag_chunks WHERE embedding IS NOT NULL");
                sqlx::query_as(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.into_iter().map(Chunk::try_from).collect()
    }
}

/// Rank embedded chunks against `query`, most similar first.
///
/// Chunks whose similarity is undefined (dimension mismatch, zero vector) are
/// dropped. Ties fall back to ascending surrogate id.
fn rank_by_similarity(
    chunks: Vec<Chunk>,
    query: &[f32],
    k: usize,
    threshold: Option<f32>,
) -> Vec<ScoredChunk> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let similarity = cosine_similarity(chunk.embedding.as_deref()?, query)?;
            Some(ScoredChunk { chunk, similarity })
        })
        .filter(|s| threshold.map_or(true, |t| s.similarity >= t))
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.chunk.id.cmp(&b.chunk.id))
    });
    scored.truncate(k);
    scored
}

#[async_trait]
impl ChunkRepository for SqliteChunkRepository {
    async fn save(&self, chunk: &Chunk) -> DomainResult<i64> {
        let embedding_bytes = match &chunk.embedding {
            Some(embedding) => {
                self.check_dimension(embedding)?;
                Some(Self::embedding_to_bytes(embedding))
            }
            None => None,
        };
        let embedding_dim = chunk.embedding.as_ref().map(|e| e.len() as i64);

        let result = sqlx::query(
            r#"INSERT INTO rag_chunks (external_id, text, embedding, embedding_dim, collection,
               item_name, item_version, category, doc_type, language, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&chunk.external_id)
        .bind(&chunk.text)
        .bind(embedding_bytes)
        .bind(embedding_dim)
        .bind(&chunk.metadata.collection)
        .bind(&chunk.metadata.item_name)
        .bind(&chunk.metadata.item_version)
        .bind(&chunk.metadata.category)
        .bind(&chunk.metadata.doc_type)
        .bind(&chunk.metadata.language)
        .bind(chunk.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn set_embedding(&self, id: i64, embedding: &[f32]) -> DomainResult<()> {
        self.check_dimension(embedding)?;

        let result = sqlx::query("UPDATE rag_chunks SET embedding = ?, embedding_dim = ? WHERE id = ?")
            .bind(Self::embedding_to_bytes(embedding))
            .bind(embedding.len() as i64)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ChunkNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn find_by_external_id(&self, external_id: &str) -> DomainResult<Option<Chunk>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM rag_chunks WHERE external_id = ?");
        let row: Option<ChunkRow> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Chunk::try_from).transpose()
    }

    async fn find_by_metadata_field(
        &self,
        field: MetadataField,
        value: &str,
    ) -> DomainResult<Vec<Chunk>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM rag_chunks WHERE {} = ? ORDER BY id",
            field.column()
        );
        let rows: Vec<ChunkRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Chunk::try_from).collect()
    }

    async fn find_without_embedding(&self, limit: usize) -> DomainResult<Vec<Chunk>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM rag_chunks WHERE embedding IS NULL ORDER BY id LIMIT ?"
        );
        let rows: Vec<ChunkRow> = sqlx::query_as(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Chunk::try_from).collect()
    }

    async fn find_top_k_by_similarity(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> DomainResult<Vec<ScoredChunk>> {
        let candidates = self.fetch_embedded(filter).await?;
        Ok(rank_by_similarity(candidates, query_vector, k, None))
    }

    async fn find_above_threshold(
        &self,
        query_vector: &[f32],
        threshold: f32,
        k: usize,
    ) -> DomainResult<Vec<ScoredChunk>> {
        let candidates = self.fetch_embedded(None).await?;
        Ok(rank_by_similarity(candidates, query_vector, k, Some(threshold)))
    }

    async fn count(&self) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn count_with_embedding(&self) -> DomainResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks WHERE embedding IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.unsigned_abs())
    }
}

#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    external_id: String,
    text: String,
    embedding: Option<Vec<u8>>,
    collection: Option<String>,
    item_name: Option<String>,
    item_version: Option<String>,
    category: Option<String>,
    doc_type: Option<String>,
    language: Option<String>,
    created_at: String,
}

impl TryFrom<ChunkRow> for Chunk {
    type Error = DomainError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        let embedding = row
            .embedding
            .as_deref()
            .map(SqliteChunkRepository::bytes_to_embedding)
            .transpose()?;

        let created_at = parse_datetime(&row.created_at)?;

        Ok(Chunk {
            id: Some(row.id),
            external_id: row.external_id,
            text: row.text,
            metadata: ChunkMetadata {
                collection: row.collection,
                item_name: row.item_name,
                item_version: row.item_version,
                category: row.category,
                doc_type: row.doc_type,
                language: row.language,
            },
            embedding,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_repo(dimension: usize) -> SqliteChunkRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteChunkRepository::new(pool, dimension)
    }

    fn chunk(external_id: &str, collection: Option<&str>, embedding: Option<Vec<f32>>) -> Chunk {
        let mut chunk = Chunk::new(external_id, format!("text of {external_id}"))
            .unwrap()
            .with_metadata(ChunkMetadata {
                collection: collection.map(str::to_string),
                category: Some("guide".to_string()),
                ..Default::default()
            });
        chunk.embedding = embedding;
        chunk
    }

    #[tokio::test]
    async fn test_empty_store_reads() {
        let repo = setup_repo(3).await;

        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.count_with_embedding().await.unwrap(), 0);
        assert!(repo.find_by_external_id("missing").await.unwrap().is_none());
        assert!(repo
            .find_top_k_by_similarity(&[1.0, 0.0, 0.0], 5, None)
            .await
            .unwrap()
            .is_empty());
        assert!(repo
            .find_above_threshold(&[1.0, 0.0, 0.0], 0.5, 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_embedding_round_trip() {
        let repo = setup_repo(3).await;
        let embedding = vec![0.125, -2.5, 3.75];

        let id = repo
            .save(&chunk("c-1", Some("Alpha"), Some(embedding.clone())))
            .await
            .unwrap();
        let stored = repo.find_by_external_id("c-1").await.unwrap().unwrap();

        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.embedding, Some(embedding));
        assert_eq!(stored.metadata.collection.as_deref(), Some("Alpha"));
        assert_eq!(stored.metadata.category.as_deref(), Some("guide"));
    }

    #[tokio::test]
    async fn test_save_rejects_wrong_dimension() {
        let repo = setup_repo(3).await;
        let result = repo.save(&chunk("c-1", None, Some(vec![1.0, 2.0]))).await;

        assert!(matches!(
            result,
            Err(DomainError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_rejected() {
        let repo = setup_repo(3).await;
        repo.save(&chunk("c-1", None, None)).await.unwrap();

        let result = repo.save(&chunk("c-1", None, None)).await;
        assert!(matches!(result, Err(DomainError::DatabaseError(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_top_k_skips_unembedded_and_orders_by_similarity() {
        let repo = setup_repo(2).await;
        repo.save(&chunk("far", None, Some(vec![0.0, 1.0]))).await.unwrap();
        repo.save(&chunk("near", None, Some(vec![1.0, 0.1]))).await.unwrap();
        repo.save(&chunk("mid", None, Some(vec![1.0, 1.0]))).await.unwrap();
        repo.save(&chunk("bare", None, None)).await.unwrap();

        let results = repo
            .find_top_k_by_similarity(&[1.0, 0.0], 10, None)
            .await
            .unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.chunk.external_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert!(results.iter().all(|r| r.chunk.has_embedding()));

        let top1 = repo
            .find_top_k_by_similarity(&[1.0, 0.0], 1, None)
            .await
            .unwrap();
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].chunk.external_id, "near");
    }

    #[tokio::test]
    async fn test_ties_are_broken_by_insert_order() {
        let repo = setup_repo(2).await;
        repo.save(&chunk("first", None, Some(vec![1.0, 0.0]))).await.unwrap();
        repo.save(&chunk("second", None, Some(vec![2.0, 0.0]))).await.unwrap();

        for _ in 0..3 {
            let results = repo
                .find_top_k_by_similarity(&[1.0, 0.0], 2, None)
                .await
                .unwrap();
            assert_eq!(results[0].chunk.external_id, "first");
            assert_eq!(results[1].chunk.external_id, "second");
        }
    }

    #[tokio::test]
    async fn test_filter_applies_before_ranking() {
        let repo = setup_repo(2).await;
        repo.save(&chunk("beta-best", Some("Beta"), Some(vec![1.0, 0.0]))).await.unwrap();
        repo.save(&chunk("alpha-1", Some("Alpha"), Some(vec![0.0, 1.0]))).await.unwrap();
        repo.save(&chunk("alpha-2", Some("Alpha"), Some(vec![0.5, 0.5]))).await.unwrap();

        let filter = MetadataFilter::collection("Alpha");
        let results = repo
            .find_top_k_by_similarity(&[1.0, 0.0], 1, Some(&filter))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.external_id, "alpha-2");
    }

    #[tokio::test]
    async fn test_threshold_excludes_dissimilar() {
        let repo = setup_repo(2).await;
        repo.save(&chunk("same", None, Some(vec![1.0, 0.0]))).await.unwrap();
        repo.save(&chunk("close", None, Some(vec![1.0, 0.2]))).await.unwrap();
        repo.save(&chunk("orthogonal", None, Some(vec![0.0, 1.0]))).await.unwrap();

        let results = repo.find_above_threshold(&[1.0, 0.0], 0.9, 10).await.unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.chunk.external_id.as_str()).collect();
        assert_eq!(ids, vec!["same", "close"]);
        assert!(results.iter().all(|r| r.similarity >= 0.9));
    }

    #[tokio::test]
    async fn test_set_embedding_and_counts() {
        let repo = setup_repo(2).await;
        let id = repo.save(&chunk("c-1", None, None)).await.unwrap();
        repo.save(&chunk("c-2", None, None)).await.unwrap();

        assert_eq!(repo.find_without_embedding(10).await.unwrap().len(), 2);
        repo.set_embedding(id, &[0.3, 0.4]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.count_with_embedding().await.unwrap(), 1);
        let pending = repo.find_without_embedding(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].external_id, "c-2");

        assert!(matches!(
            repo.set_embedding(999, &[0.3, 0.4]).await,
            Err(DomainError::ChunkNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_metadata_field() {
        let repo = setup_repo(2).await;
        repo.save(&chunk("a", Some("Alpha"), None)).await.unwrap();
        repo.save(&chunk("b", Some("Beta"), None)).await.unwrap();
        repo.save(&chunk("c", Some("Alpha"), None)).await.unwrap();

        let alpha = repo
            .find_by_metadata_field(MetadataField::Collection, "Alpha")
            .await
            .unwrap();
        assert_eq!(alpha.len(), 2);
        assert!(alpha.iter().all(|c| c.metadata.collection.as_deref() == Some("Alpha")));

        let guides = repo
            .find_by_metadata_field(MetadataField::Category, "guide")
            .await
            .unwrap();
        assert_eq!(guides.len(), 3);
    }

    #[tokio::test]
    async fn test_non_finite_embeddings_are_never_ranked() {
        let repo = setup_repo(3).await;
        repo.save(&chunk("overflow", None, Some(vec![f32::INFINITY, 0.0, 0.0])))
            .await
            .unwrap();
        repo.save(&chunk("orthogonal", None, Some(vec![0.0, 1.0, 0.0])))
            .await
            .unwrap();
        repo.save(&chunk("aligned", None, Some(vec![1.0, 0.0, 0.0])))
            .await
            .unwrap();

        let results = repo
            .find_top_k_by_similarity(&[1.0, 0.0, 0.0], 3, None)
            .await
            .unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.chunk.external_id.as_str()).collect();
        assert_eq!(ids, vec!["aligned", "orthogonal"]);
        assert!(results.iter().all(|r| r.similarity.is_finite()));
    }

    #[test]
    fn test_rank_with_zero_k() {
        let c = chunk("x", None, Some(vec![1.0]));
        assert!(rank_by_similarity(vec![c], &[1.0], 0, None).is_empty());
    }

    #[test]
    fn test_invalid_bytes_length() {
        assert!(SqliteChunkRepository::bytes_to_embedding(&[0, 0, 0]).is_err());
    }
}
