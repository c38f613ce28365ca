//! Wiring of the RAG components for a single CLI invocation.
//!
//! Everything is built once from the loaded [`Config`] and handed to the
//! command that runs. Components receive their collaborators through
//! constructors; nothing here is global.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::watch;

use crate::adapters::embeddings::build_provider;
use crate::adapters::sqlite::{initialize_database, SqliteChunkRepository};
use crate::domain::models::Config;
use crate::domain::ports::{ChunkRepository, EmbeddingProvider};
use crate::services::{
    EmbeddingService, IngestionPipeline, PromptBuilder, RagService, RetrievalEngine,
};

pub struct AppContext {
    pub config: Config,
    pub embeddings: Arc<EmbeddingService>,
    pub pipeline: IngestionPipeline,
    pub rag: RagService,
}

impl AppContext {
    /// Open the database, apply migrations and select the embedding provider.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("Failed to initialize database at {}", config.database.path))?;
        let repository: Arc<dyn ChunkRepository> =
            Arc::new(SqliteChunkRepository::new(pool, config.embedding.dimension));
        let provider =
            build_provider(&config.embedding).context("Failed to configure embedding provider")?;

        Ok(Self::new(config, repository, provider))
    }

    /// Assemble the services around an existing store and provider.
    pub fn new(
        config: Config,
        repository: Arc<dyn ChunkRepository>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let embeddings = Arc::new(EmbeddingService::from_config(provider, &config.embedding));
        let pipeline =
            IngestionPipeline::new(Arc::clone(&repository), Arc::clone(&embeddings), &config.rag);
        let retrieval =
            RetrievalEngine::new(Arc::clone(&repository), Arc::clone(&embeddings), &config.rag);
        let rag = RagService::new(
            repository,
            retrieval,
            PromptBuilder::new(config.prompt.clone()),
            config.rag.clone(),
        );

        Self {
            config,
            embeddings,
            pipeline,
            rag,
        }
    }

    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.pipeline = self.pipeline.with_shutdown(shutdown);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.pipeline = self.pipeline.with_progress(progress);
        self
    }
}

/// Receiver that turns `true` on the first Ctrl-C.
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping at the next pause");
            let _ = tx.send(true);
        }
    });
    rx
}
