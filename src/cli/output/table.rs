//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};

use super::{single_line, truncate};
use crate::domain::models::ScoredChunk;

const PREVIEW_CHARS: usize = 60;

/// Borderless table with bold uppercase headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).add_attribute(Attribute::Bold)),
        );
    table
}

/// One row per hit: id, collection, item, category, similarity, preview.
pub fn search_results_table(results: &[ScoredChunk]) -> Table {
    let mut table = list_table(&["id", "collection", "item", "category", "similarity", "preview"]);

    for scored in results {
        let chunk = &scored.chunk;
        let meta = &chunk.metadata;
        table.add_row(vec![
            Cell::new(&chunk.external_id),
            Cell::new(meta.collection.as_deref().unwrap_or("-")),
            Cell::new(meta.item_name.as_deref().unwrap_or("-")),
            Cell::new(meta.category.as_deref().unwrap_or("-")),
            Cell::new(format!("{:.4}", scored.similarity)).set_alignment(CellAlignment::Right),
            Cell::new(truncate(&single_line(&chunk.text), PREVIEW_CHARS)),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, ChunkMetadata};

    #[test]
    fn test_search_results_table_rows() {
        let chunk = Chunk::new("rlc-1", "Dragons\ndrop scales.")
            .unwrap()
            .with_metadata(ChunkMetadata {
                collection: Some("RLCraft".to_string()),
                ..Default::default()
            });
        let results = vec![ScoredChunk {
            chunk,
            similarity: 0.912_345,
        }];

        let rendered = search_results_table(&results).to_string();

        assert!(rendered.contains("SIMILARITY"));
        assert!(rendered.contains("rlc-1"));
        assert!(rendered.contains("RLCraft"));
        assert!(rendered.contains("0.9123"));
        assert!(rendered.contains("Dragons drop scales."));
    }
}
