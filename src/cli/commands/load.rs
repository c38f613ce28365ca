//! Implementation of the `ragkeeper load` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::adapters::sources::JsonFileSource;
use crate::cli::context::AppContext;
use crate::cli::output::{create_progress_bar, output, CommandOutput};
use crate::domain::models::LoadReport;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// JSON file of chunk definitions (defaults to `rag.data_file`)
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct LoadOutput {
    pub source: PathBuf,
    pub report: LoadReport,
    pub loading_stats: String,
}

impl CommandOutput for LoadOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.report.skipped {
            lines.push(format!(
                "Store already holds {} chunks; nothing loaded from {}.",
                self.report.total_in_store,
                self.source.display()
            ));
            lines.push("Clear the rag_chunks table to reload.".to_string());
        } else {
            lines.push(format!(
                "Loaded {} chunk definitions from {}: {} processed, {} failed.",
                self.report.attempted(),
                self.source.display(),
                self.report.processed,
                self.report.failed
            ));
        }
        lines.push(self.loading_stats.clone());
        lines.join("\n")
    }
}

pub async fn execute(args: LoadArgs, ctx: AppContext, json_mode: bool) -> Result<()> {
    let source_path = args
        .file
        .unwrap_or_else(|| PathBuf::from(&ctx.config.rag.data_file));
    let ctx = ctx.with_progress(create_progress_bar(0, !json_mode));

    let source = JsonFileSource::new(&source_path);
    let report = ctx
        .pipeline
        .load_all(&source)
        .await
        .with_context(|| format!("Failed to load chunks from {}", source_path.display()))?;

    let loading_stats = ctx
        .pipeline
        .loading_stats()
        .await
        .context("Failed to read loading statistics")?;

    output(
        &LoadOutput {
            source: source_path,
            report,
            loading_stats,
        },
        json_mode,
    );
    Ok(())
}
