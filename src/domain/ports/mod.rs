//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - ChunkRepository: chunk persistence and similarity search
//! - EmbeddingProvider: text to vector conversion
//! - ChunkSource: bulk chunk definitions for ingestion

pub mod chunk_repository;
pub mod chunk_source;
pub mod embedding;
pub mod null_embedding;

pub use chunk_repository::ChunkRepository;
pub use chunk_source::{ChunkSource, SourceError};
pub use embedding::EmbeddingProvider;
pub use null_embedding::NullEmbeddingProvider;
