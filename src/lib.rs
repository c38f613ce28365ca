//! ragkeeper - retrieval-augmented prompt construction over SQLite
//!
//! Ingests documentation chunks, embeds them through a remote provider,
//! stores them with their vectors and, at question time, retrieves the most
//! similar chunks and folds them into the prompt handed to generation.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): SQLite store, embedding providers, chunk sources
//! - **Service Layer** (`services`): ingestion, retrieval and prompt composition
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use ragkeeper::cli::AppContext;
//! use ragkeeper::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = AppContext::bootstrap(ConfigLoader::load()?).await?;
//!     println!("{}", ctx.rag.generate_prompt("How do I tame a dragon?").await);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Chunk, ChunkMetadata, Config, EmbeddingOutcome, LoadReport, MetadataField, MetadataFilter,
    RagConfig, RagStats, RawChunk, RetrievalQuery, ScoredChunk,
};
pub use domain::ports::{ChunkRepository, ChunkSource, EmbeddingProvider};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    EmbeddingService, IngestionError, IngestionPipeline, PromptBuilder, RagService,
    RetrievalEngine,
};
