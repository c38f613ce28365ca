//! Implementation of the `ragkeeper prompt` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// User question to build the generation prompt for
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct PromptOutput {
    pub query: String,
    pub rag_available: bool,
    pub prompt: String,
}

impl CommandOutput for PromptOutput {
    fn to_human(&self) -> String {
        self.prompt.clone()
    }
}

pub async fn execute(args: PromptArgs, ctx: AppContext, json_mode: bool) -> Result<()> {
    let rag_available = ctx.rag.is_rag_available().await;
    let prompt = ctx.rag.generate_prompt(&args.query).await;

    output(
        &PromptOutput {
            query: args.query,
            rag_available,
            prompt,
        },
        json_mode,
    );
    Ok(())
}
