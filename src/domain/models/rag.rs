//! Request and report types exchanged with the RAG services.

use serde::{Deserialize, Serialize};

use super::chunk::MetadataFilter;

/// An ephemeral retrieval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub text: String,
    /// Falls back to the configured default when absent.
    pub top_k: Option<usize>,
    pub metadata_filter: Option<MetadataFilter>,
    /// When set, only chunks at or above this cosine similarity are returned.
    pub similarity_threshold: Option<f32>,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: None,
            metadata_filter: None,
            similarity_threshold: None,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.metadata_filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }
}

/// Snapshot of RAG configuration and store counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagStats {
    pub enabled: bool,
    pub total_chunks: u64,
    pub chunks_with_embedding: u64,
    pub default_top_k: usize,
    pub similarity_threshold: f32,
}

/// Outcome of one ingestion (or backfill) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Items persisted with an embedding attached.
    pub processed: usize,
    /// Items whose embedding or write failed.
    pub failed: usize,
    pub total_in_store: u64,
    pub total_with_embedding: u64,
    /// True when the run was short-circuited because the store already had data.
    pub skipped: bool,
}

impl LoadReport {
    pub fn skipped(total_in_store: u64, total_with_embedding: u64) -> Self {
        Self {
            total_in_store,
            total_with_embedding,
            skipped: true,
            ..Default::default()
        }
    }

    pub fn attempted(&self) -> usize {
        self.processed + self.failed
    }
}

/// `"Total chunks: N, Chunks with embeddings: M (P%)"`.
pub fn format_loading_stats(total: u64, with_embedding: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let percent = if total > 0 {
        with_embedding as f64 * 100.0 / total as f64
    } else {
        0.0
    };
    format!("Total chunks: {total}, Chunks with embeddings: {with_embedding} ({percent:.1}%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_stats_format() {
        assert_eq!(
            format_loading_stats(0, 0),
            "Total chunks: 0, Chunks with embeddings: 0 (0.0%)"
        );
        assert_eq!(
            format_loading_stats(12, 11),
            "Total chunks: 12, Chunks with embeddings: 11 (91.7%)"
        );
        assert_eq!(
            format_loading_stats(4, 4),
            "Total chunks: 4, Chunks with embeddings: 4 (100.0%)"
        );
    }

    #[test]
    fn test_skipped_report() {
        let report = LoadReport::skipped(5, 3);
        assert!(report.skipped);
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.total_in_store, 5);
    }

    #[test]
    fn test_query_builder() {
        let query = RetrievalQuery::new("how to tame dragons")
            .with_top_k(3)
            .with_filter(MetadataFilter::collection("BetterMC"))
            .with_threshold(0.8);

        assert_eq!(query.top_k, Some(3));
        assert_eq!(query.similarity_threshold, Some(0.8));
        assert_eq!(query.metadata_filter.unwrap().value, "BetterMC");
    }
}
