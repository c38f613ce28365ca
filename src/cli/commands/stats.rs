//! Implementation of the `ragkeeper stats` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::RagStats;

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub available: bool,
    pub provider: String,
    #[serde(flatten)]
    pub stats: RagStats,
    pub loading_stats: String,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        [
            format!("RAG enabled:          {}", self.stats.enabled),
            format!("RAG available:        {}", self.available),
            format!("Embedding provider:   {}", self.provider),
            format!("Default top-k:        {}", self.stats.default_top_k),
            format!("Similarity threshold: {}", self.stats.similarity_threshold),
            self.loading_stats.clone(),
        ]
        .join("\n")
    }
}

pub async fn execute(ctx: AppContext, json_mode: bool) -> Result<()> {
    let stats = ctx.rag.get_stats().await;
    let available = ctx.rag.is_rag_available().await;
    let loading_stats = ctx
        .pipeline
        .loading_stats()
        .await
        .context("Failed to read loading statistics")?;

    output(
        &StatsOutput {
            available,
            provider: ctx.embeddings.provider_name().to_string(),
            stats,
            loading_stats,
        },
        json_mode,
    );
    Ok(())
}
