//! Service layer: the RAG pipeline built on the domain ports.

pub mod embedding_service;
pub mod ingestion;
pub mod pacing;
pub mod prompt_builder;
pub mod rag_service;
pub mod retrieval;

pub use embedding_service::EmbeddingService;
pub use ingestion::{IngestionError, IngestionPipeline};
pub use pacing::Pacer;
pub use prompt_builder::PromptBuilder;
pub use rag_service::RagService;
pub use retrieval::RetrievalEngine;
