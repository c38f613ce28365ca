//! Bulk chunk sources consumed by ingestion.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileSource;
pub use memory::VecSource;
