//! Implementation of the `ragkeeper search` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, search_results_table, single_line, truncate, CommandOutput};
use crate::domain::models::{MetadataFilter, RetrievalQuery, ScoredChunk};

const PREVIEW_CHARS: usize = 200;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Maximum number of results (defaults to `rag.default_top_k`)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only search chunks of this collection
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Minimum cosine similarity in [-1, 1]
    #[arg(short, long)]
    pub threshold: Option<f32>,
}

impl SearchArgs {
    pub fn to_query(&self) -> RetrievalQuery {
        let mut query = RetrievalQuery::new(&self.query);
        if let Some(limit) = self.limit {
            query = query.with_top_k(limit);
        }
        if let Some(collection) = &self.collection {
            query = query.with_filter(MetadataFilter::collection(collection));
        }
        if let Some(threshold) = self.threshold {
            query = query.with_threshold(threshold);
        }
        query
    }
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub collection: Option<String>,
    pub item: Option<String>,
    pub category: Option<String>,
    pub similarity: f32,
    pub preview: String,
}

impl From<&ScoredChunk> for SearchHit {
    fn from(scored: &ScoredChunk) -> Self {
        let meta = &scored.chunk.metadata;
        Self {
            id: scored.chunk.external_id.clone(),
            collection: meta.collection.clone(),
            item: meta.item_name.clone(),
            category: meta.category.clone(),
            similarity: scored.similarity,
            preview: truncate(&single_line(&scored.chunk.text), PREVIEW_CHARS),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub enabled: bool,
    pub results: Vec<SearchHit>,
    #[serde(skip)]
    table: String,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if !self.enabled {
            return "RAG is disabled; no search performed.".to_string();
        }
        if self.results.is_empty() {
            return "No matching chunks found.".to_string();
        }
        format!("{}\n\n{} result(s)", self.table, self.results.len())
    }
}

pub async fn execute(args: SearchArgs, ctx: AppContext, json_mode: bool) -> Result<()> {
    let query = args.to_query();
    let scored = ctx.rag.retrieve(&query).await;

    output(
        &SearchOutput {
            query: args.query,
            enabled: ctx.config.rag.enabled,
            results: scored.iter().map(SearchHit::from).collect(),
            table: search_results_table(&scored).to_string(),
        },
        json_mode,
    );
    Ok(())
}
