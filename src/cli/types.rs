//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::backfill::BackfillArgs;
use super::commands::embed::EmbedArgs;
use super::commands::load::LoadArgs;
use super::commands::prompt::PromptArgs;
use super::commands::search::SearchArgs;

#[derive(Parser, Debug)]
#[command(name = "ragkeeper")]
#[command(about = "ragkeeper - retrieval-augmented prompt builder over a SQLite vector store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .ragkeeper/config.yaml layering)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest chunk definitions from a JSON file into an empty store
    Load(LoadArgs),

    /// Embed stored chunks that are still missing an embedding
    Backfill(BackfillArgs),

    /// Show RAG configuration, store counts and availability
    Stats,

    /// Embed a text and show the resulting vector's shape
    Embed(EmbedArgs),

    /// Similarity search over the stored chunks
    Search(SearchArgs),

    /// Print the prompt that would be handed to generation
    Prompt(PromptArgs),

    /// Run the start-up path: auto-load if configured, then check availability
    ServeCheck,
}
