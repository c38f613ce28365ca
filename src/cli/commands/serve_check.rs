//! Implementation of the `ragkeeper serve-check` command.
//!
//! Runs the start-up path of a serving process: load the configured data
//! file when `rag.auto_load_on_start` is set, then report whether the RAG
//! path is usable. A load failure other than an interrupt is reported but
//! does not fail the check, so a host can still serve without context.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::adapters::sources::JsonFileSource;
use crate::cli::context::AppContext;
use crate::cli::output::{create_progress_bar, output, CommandOutput};
use crate::domain::models::{LoadReport, RagStats};
use crate::services::IngestionError;

#[derive(Debug, Serialize)]
pub struct ServeCheckOutput {
    pub auto_load: bool,
    pub data_file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<LoadReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    pub stats: RagStats,
    pub available: bool,
}

impl CommandOutput for ServeCheckOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        if !self.auto_load {
            lines.push("Auto-load on start is disabled.".to_string());
        } else if let Some(error) = &self.load_error {
            lines.push(format!("Loading {} failed: {error}", self.data_file.display()));
        } else if let Some(report) = &self.report {
            if report.skipped {
                lines.push("Store already populated; load skipped.".to_string());
            } else {
                lines.push(format!(
                    "Loaded {}: {} processed, {} failed.",
                    self.data_file.display(),
                    report.processed,
                    report.failed
                ));
            }
        }

        lines.push(format!(
            "{} of {} chunks embedded.",
            self.stats.chunks_with_embedding, self.stats.total_chunks
        ));
        lines.push(if self.available {
            "RAG is available.".to_string()
        } else {
            "RAG is unavailable; prompts will use the fallback.".to_string()
        });
        lines.join("\n")
    }
}

pub async fn execute(ctx: AppContext, json_mode: bool) -> Result<()> {
    let auto_load = ctx.config.rag.auto_load_on_start;
    let data_file = PathBuf::from(&ctx.config.rag.data_file);
    let ctx = ctx.with_progress(create_progress_bar(0, auto_load && !json_mode));

    let mut report = None;
    let mut load_error = None;

    if auto_load {
        tracing::info!(data_file = %data_file.display(), "auto-loading RAG data on start");
        match ctx.pipeline.load_all(&JsonFileSource::new(&data_file)).await {
            Ok(loaded) => report = Some(loaded),
            Err(err @ IngestionError::Interrupted { .. }) => return Err(err.into()),
            Err(err) => {
                tracing::error!(error = %err, "failed to load RAG data on start");
                load_error = Some(err.to_string());
            }
        }
    } else {
        tracing::info!("RAG auto-load on start is disabled");
    }

    let stats = ctx.rag.get_stats().await;
    let available = ctx.rag.is_rag_available().await;

    output(
        &ServeCheckOutput {
            auto_load,
            data_file,
            report,
            load_error,
            stats,
            available,
        },
        json_mode,
    );
    Ok(())
}
