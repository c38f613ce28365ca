//! Prompt composition for the generation step.
//!
//! Renders retrieved chunks as numbered documents and wraps them in the
//! assistant persona. With no context the fallback prompt is used instead.

use std::fmt::Write;

use crate::domain::models::{Chunk, PromptConfig};

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// Numbered document blocks, or an empty string for no chunks.
    pub fn build_context(&self, chunks: &[Chunk]) -> String {
        let mut context = String::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let _ = writeln!(context, "--- Document {} ---", i + 1);

            let meta = &chunk.metadata;
            if let Some(collection) = &meta.collection {
                let _ = writeln!(context, "{}: {collection}", self.config.collection_label);
            }
            if let Some(item) = &meta.item_name {
                let _ = writeln!(context, "{}: {item}", self.config.item_label);
            }
            if let Some(category) = &meta.category {
                let _ = writeln!(context, "Category: {category}");
            }

            context.push('\n');
            context.push_str(&chunk.text);
            context.push_str("\n\n");
        }

        context
    }

    /// Persona, context block, answering instructions and the verbatim query.
    pub fn build_augmented_prompt(&self, query: &str, chunks: &[Chunk]) -> String {
        let context = self.build_context(chunks);
        if context.is_empty() {
            return self.build_fallback_prompt(query);
        }

        let domain = &self.config.domain;
        let collection = self.config.collection_label.to_lowercase();
        let item = self.config.item_label.to_lowercase();

        format!(
            "You are a knowledgeable {domain} {collection} expert assistant. \
Your role is to help players understand and use various {domain} {item}s and {collection}s.

CONTEXT FROM DOCUMENTATION:
{context}

INSTRUCTIONS:
- Answer the user's question based primarily on the provided context above
- Be specific and reference the {item} names and {collection}s mentioned in the context
- If the context contains relevant information, cite it in your answer
- If the context doesn't fully answer the question, use your general {domain} knowledge but mention the limitation
- Provide step-by-step instructions when applicable
- If the question is not about {domain}, politely redirect to {domain} topics

USER'S QUESTION:
{query}

Please provide a helpful, accurate, and friendly response.
"
        )
    }

    /// Context-free persona prompt.
    pub fn build_fallback_prompt(&self, query: &str) -> String {
        let domain = &self.config.domain;
        let topics: String = self
            .config
            .fallback_topics
            .iter()
            .map(|topic| format!("- {topic}\n"))
            .collect();

        format!(
            "You are a helpful {domain} assistant chatbot. You have extensive knowledge about:
{topics}
Please provide helpful, accurate, and friendly responses to {domain}-related questions.
If the question is not about {domain}, politely redirect the conversation back to {domain} topics.

User's question: {query}
"
        )
    }
}
