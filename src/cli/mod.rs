//! Command-line interface for ragkeeper.

pub mod commands;
pub mod context;
pub mod output;
pub mod types;

use anyhow::{Context, Result};

pub use context::{shutdown_on_ctrl_c, AppContext};
pub use types::{Cli, Commands};

use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{scrub_secrets, LogConfig, LoggerImpl};
use crate::services::IngestionError;

/// Exit status for a run stopped by Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

/// Load configuration, start logging, wire the services and run `cli.command`.
pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let mut log_config = LogConfig::from_settings(&config.logging);
    if cli.verbose {
        log_config = log_config.verbose();
    }
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;

    let ctx = AppContext::bootstrap(config)
        .await?
        .with_shutdown(shutdown_on_ctrl_c());

    match cli.command {
        Commands::Load(args) => commands::load::execute(args, ctx, cli.json).await,
        Commands::Backfill(args) => commands::backfill::execute(args, ctx, cli.json).await,
        Commands::Stats => commands::stats::execute(ctx, cli.json).await,
        Commands::Embed(args) => commands::embed::execute(args, ctx, cli.json).await,
        Commands::Search(args) => commands::search::execute(args, ctx, cli.json).await,
        Commands::Prompt(args) => commands::prompt::execute(args, ctx, cli.json).await,
        Commands::ServeCheck => commands::serve_check::execute(ctx, cli.json).await,
    }
}

/// Print `err` (with API keys scrubbed) and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let message = scrub_secrets(&format!("{err:#}"));

    if json_mode {
        let body = serde_json::json!({ "success": false, "error": message });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {message}");
    }

    let interrupted = err
        .chain()
        .any(|cause| matches!(
            cause.downcast_ref::<IngestionError>(),
            Some(IngestionError::Interrupted { .. })
        ));
    std::process::exit(if interrupted { EXIT_INTERRUPTED } else { 1 })
}
