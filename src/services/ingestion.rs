//! Ingestion pipeline
//!
//! Loads raw chunk definitions from a [`ChunkSource`], embeds them in paced
//! batches and persists each chunk on its own. A failing item never stops
//! the run; only an unreadable source, a shutdown signal or a second
//! concurrent trigger do.

use indicatif::ProgressBar;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{format_loading_stats, Chunk, LoadReport, RagConfig, RawChunk};
use crate::domain::ports::{ChunkRepository, ChunkSource, SourceError};
use crate::services::embedding_service::EmbeddingService;
use crate::services::pacing::Pacer;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    SourceRead(#[from] SourceError),

    #[error("Ingestion interrupted after {processed} processed and {failed} failed items")]
    Interrupted { processed: usize, failed: usize },

    #[error("Ingestion is already running")]
    AlreadyRunning,

    #[error("Chunk store unavailable: {0}")]
    Store(#[source] DomainError),
}

/// What happened to one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemResult {
    /// Saved with an embedding.
    Embedded,
    /// Saved without an embedding, or not saved at all.
    Failed,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    processed: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, result: ItemResult) {
        match result {
            ItemResult::Embedded => self.processed += 1,
            ItemResult::Failed => self.failed += 1,
        }
    }

    fn interrupted(self) -> IngestionError {
        IngestionError::Interrupted {
            processed: self.processed,
            failed: self.failed,
        }
    }
}

pub struct IngestionPipeline {
    repository: Arc<dyn ChunkRepository>,
    embeddings: Arc<EmbeddingService>,
    batch_size: usize,
    item_pacer: Pacer,
    batch_pacer: Pacer,
    run_lock: Mutex<()>,
    shutdown: Option<watch::Receiver<bool>>,
    progress: ProgressBar,
}

impl IngestionPipeline {
    pub fn new(
        repository: Arc<dyn ChunkRepository>,
        embeddings: Arc<EmbeddingService>,
        config: &RagConfig,
    ) -> Self {
        Self {
            repository,
            embeddings,
            batch_size: config.batch_size.max(1),
            item_pacer: Pacer::from_millis(config.item_delay_ms),
            batch_pacer: Pacer::from_millis(config.inter_batch_delay_ms),
            run_lock: Mutex::new(()),
            shutdown: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Abort at the next pacing wait once `shutdown` turns `true`.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Report per-item progress on `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Load every definition from `source` into an empty store.
    ///
    /// Returns a skipped report without reading the source when the store
    /// already holds chunks.
    pub async fn load_all(&self, source: &dyn ChunkSource) -> Result<LoadReport, IngestionError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IngestionError::AlreadyRunning)?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ingestion", %run_id, source = %source.describe());

        let result = async {
            let existing = self.repository.count().await.map_err(IngestionError::Store)?;
            if existing > 0 {
                tracing::info!(
                    existing,
                    "store already holds chunks; skipping load (clear the rag_chunks table to reload)"
                );
                let with_embedding = self
                    .repository
                    .count_with_embedding()
                    .await
                    .map_err(IngestionError::Store)?;
                return Ok(LoadReport::skipped(existing, with_embedding));
            }

            let definitions = source.read_all().await?;
            tracing::info!(
                count = definitions.len(),
                batch_size = self.batch_size,
                provider = self.embeddings.provider_name(),
                "loaded chunk definitions; starting embedding generation"
            );

            let tally = self.ingest_batches(definitions).await?;
            self.finish(tally).await
        }
        .instrument(span)
        .await;

        self.progress.finish_and_clear();
        result
    }

    /// Embed stored chunks that have no embedding yet, up to `limit` of them.
    pub async fn backfill_missing(&self, limit: usize) -> Result<LoadReport, IngestionError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IngestionError::AlreadyRunning)?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("backfill", %run_id, limit);

        let result = async {
            let pending = self
                .repository
                .find_without_embedding(limit)
                .await
                .map_err(IngestionError::Store)?;
            tracing::info!(count = pending.len(), "chunks missing embeddings");

            self.progress.set_length(pending.len() as u64);
            let mut tally = Tally::default();
            let total_batches = pending.len().div_ceil(self.batch_size);

            for (index, batch) in pending.chunks(self.batch_size).enumerate() {
                for chunk in batch {
                    self.pace(&self.item_pacer, tally).await?;
                    tally.record(self.backfill_one(chunk).await);
                    self.progress.inc(1);
                }
                if index + 1 < total_batches {
                    self.pause_between_batches(tally).await?;
                }
            }

            self.finish(tally).await
        }
        .instrument(span)
        .await;

        self.progress.finish_and_clear();
        result
    }

    /// `"Total chunks: N, Chunks with embeddings: M (P%)"`.
    pub async fn loading_stats(&self) -> Result<String, IngestionError> {
        let total = self.repository.count().await.map_err(IngestionError::Store)?;
        let with_embedding = self
            .repository
            .count_with_embedding()
            .await
            .map_err(IngestionError::Store)?;
        Ok(format_loading_stats(total, with_embedding))
    }

    async fn ingest_batches(&self, definitions: Vec<RawChunk>) -> Result<Tally, IngestionError> {
        let total = definitions.len();
        let total_batches = total.div_ceil(self.batch_size);
        self.progress.set_length(total as u64);

        let mut tally = Tally::default();
        let mut remaining = definitions.into_iter();

        for index in 0..total_batches {
            let batch: Vec<RawChunk> = remaining.by_ref().take(self.batch_size).collect();
            let first = index * self.batch_size + 1;
            tracing::info!(
                batch = index + 1,
                total_batches,
                range = %format!("{first}-{}", first + batch.len() - 1),
                total,
                "processing batch"
            );

            for raw in batch {
                self.pace(&self.item_pacer, tally).await?;
                tally.record(self.ingest_one(raw).await);
                self.progress.inc(1);
            }

            if index + 1 < total_batches {
                self.pause_between_batches(tally).await?;
            }
        }

        Ok(tally)
    }

    async fn ingest_one(&self, raw: RawChunk) -> ItemResult {
        let external_id = raw.id.clone();
        let mut chunk = match Chunk::try_from(raw) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::error!(chunk_id = %external_id, error = %err, "invalid chunk definition");
                return ItemResult::Failed;
            }
        };

        let outcome = self.embeddings.embed(&chunk.text).await;
        if let Some(reason) = outcome.failure_reason() {
            tracing::warn!(chunk_id = %external_id, %reason, "failed to generate embedding; saving without one");
        }
        let embedded = outcome.is_embedded();
        chunk.embedding = outcome.into_vector();

        match self.repository.save(&chunk).await {
            Ok(id) => {
                tracing::debug!(chunk_id = %external_id, id, embedded, "chunk saved");
                if embedded {
                    ItemResult::Embedded
                } else {
                    ItemResult::Failed
                }
            }
            Err(err) => {
                tracing::error!(chunk_id = %external_id, error = %err, "error processing chunk");
                ItemResult::Failed
            }
        }
    }

    async fn backfill_one(&self, chunk: &Chunk) -> ItemResult {
        let Some(id) = chunk.id else {
            return ItemResult::Failed;
        };

        let Some(vector) = self.embeddings.embed(&chunk.text).await.into_vector() else {
            tracing::warn!(chunk_id = %chunk.external_id, "embedding still unavailable");
            return ItemResult::Failed;
        };

        match self.repository.set_embedding(id, &vector).await {
            Ok(()) => ItemResult::Embedded,
            Err(err) => {
                tracing::error!(chunk_id = %chunk.external_id, error = %err, "failed to store embedding");
                ItemResult::Failed
            }
        }
    }

    async fn pause_between_batches(&self, tally: Tally) -> Result<(), IngestionError> {
        if !self.batch_pacer.is_unpaced() {
            tracing::info!("waiting before next batch");
        }
        self.batch_pacer.restart().await;
        self.pace(&self.batch_pacer, tally).await
    }

    /// Wait on `pacer`, giving up early if shutdown is signalled.
    async fn pace(&self, pacer: &Pacer, tally: Tally) -> Result<(), IngestionError> {
        let Some(shutdown) = &self.shutdown else {
            pacer.acquire().await;
            return Ok(());
        };

        if *shutdown.borrow() {
            return Err(tally.interrupted());
        }

        tokio::select! {
            () = pacer.acquire() => Ok(()),
            () = shutdown_signalled(shutdown.clone()) => {
                tracing::warn!(processed = tally.processed, failed = tally.failed, "loading interrupted");
                Err(tally.interrupted())
            }
        }
    }

    async fn finish(&self, tally: Tally) -> Result<LoadReport, IngestionError> {
        let total_in_store = self.repository.count().await.map_err(IngestionError::Store)?;
        let total_with_embedding = self
            .repository
            .count_with_embedding()
            .await
            .map_err(IngestionError::Store)?;

        tracing::info!(
            processed = tally.processed,
            failed = tally.failed,
            total_in_store,
            total_with_embedding,
            "ingestion finished"
        );

        Ok(LoadReport {
            processed: tally.processed,
            failed: tally.failed,
            total_in_store,
            total_with_embedding,
            skipped: false,
        })
    }
}

/// Resolves once the flag turns `true`. A dropped sender never resolves.
async fn shutdown_signalled(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
