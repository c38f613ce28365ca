//! Implementation of the `ragkeeper backfill` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_progress_bar, output, CommandOutput};
use crate::domain::models::LoadReport;

#[derive(Args, Debug)]
pub struct BackfillArgs {
    /// Maximum number of chunks to embed in this run
    #[arg(short, long, default_value = "100")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct BackfillOutput {
    pub report: LoadReport,
    pub loading_stats: String,
}

impl CommandOutput for BackfillOutput {
    fn to_human(&self) -> String {
        if self.report.attempted() == 0 {
            return format!("Every stored chunk already has an embedding.\n{}", self.loading_stats);
        }
        format!(
            "Backfilled {} chunks ({} still without embedding).\n{}",
            self.report.processed, self.report.failed, self.loading_stats
        )
    }
}

pub async fn execute(args: BackfillArgs, ctx: AppContext, json_mode: bool) -> Result<()> {
    let ctx = ctx.with_progress(create_progress_bar(0, !json_mode));

    let report = ctx
        .pipeline
        .backfill_missing(args.limit)
        .await
        .context("Failed to backfill embeddings")?;
    let loading_stats = ctx
        .pipeline
        .loading_stats()
        .await
        .context("Failed to read loading statistics")?;

    output(&BackfillOutput { report, loading_stats }, json_mode);
    Ok(())
}
