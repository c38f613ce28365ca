//! Infrastructure adapters for external systems.

pub mod embeddings;
pub mod sources;
pub mod sqlite;
