pub mod chunk;
pub mod config;
pub mod embedding;
pub mod rag;

pub use chunk::{Chunk, ChunkMetadata, MetadataField, MetadataFilter, RawChunk, ScoredChunk};
pub use config::{
    Config, DatabaseConfig, EmbeddingConfig, LoggingConfig, PromptConfig, RagConfig,
};
pub use embedding::{
    cosine_distance, cosine_similarity, to_vector_literal, EmbeddingOutcome,
    EmbeddingProviderKind, DEFAULT_EMBEDDING_DIMENSION, MAX_EMBEDDING_INPUT_CHARS,
};
pub use rag::{format_loading_stats, LoadReport, RagStats, RetrievalQuery};
