//! Implementation of the `ragkeeper embed` command.
//!
//! Embeds one text and shows the first few values, to check provider
//! credentials and dimension without touching the store.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::EmbeddingOutcome;

const PREVIEW_VALUES: usize = 10;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Text to embed
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedOutput {
    pub success: bool,
    pub provider: String,
    pub dimensions: usize,
    pub first_values: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutput for EmbedOutput {
    fn to_human(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Embedding with {} failed: {error}", self.provider);
        }
        let values: Vec<String> = self.first_values.iter().map(|v| format!("{v:.6}")).collect();
        format!(
            "Provider:   {}\nDimensions: {}\nFirst {}:   [{}]",
            self.provider,
            self.dimensions,
            self.first_values.len(),
            values.join(", ")
        )
    }
}

pub async fn execute(args: EmbedArgs, ctx: AppContext, json_mode: bool) -> Result<()> {
    let provider = ctx.embeddings.provider_name().to_string();

    let result = match ctx.embeddings.embed(&args.text).await {
        EmbeddingOutcome::Embedded(vector) => EmbedOutput {
            success: true,
            provider,
            dimensions: vector.len(),
            first_values: vector.into_iter().take(PREVIEW_VALUES).collect(),
            error: None,
        },
        EmbeddingOutcome::NoEmbedding(reason) | EmbeddingOutcome::Fault(reason) => EmbedOutput {
            success: false,
            provider,
            dimensions: 0,
            first_values: Vec::new(),
            error: Some(reason),
        },
    };

    output(&result, json_mode);
    Ok(())
}
