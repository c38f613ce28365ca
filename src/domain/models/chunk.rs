//! Knowledge chunk domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Labeled attributes attached to a chunk. Every field is optional.
///
/// Deserialization accepts the modpack-era key names (`modpack`, `mod_name`,
/// `mod_version`) used by existing data files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default, alias = "modpack")]
    pub collection: Option<String>,
    #[serde(default, alias = "mod_name")]
    pub item_name: Option<String>,
    #[serde(default, alias = "mod_version")]
    pub item_version: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ChunkMetadata {
    /// Value of a single field, if set.
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::Collection => self.collection.as_deref(),
            MetadataField::ItemName => self.item_name.as_deref(),
            MetadataField::ItemVersion => self.item_version.as_deref(),
            MetadataField::Category => self.category.as_deref(),
            MetadataField::DocType => self.doc_type.as_deref(),
            MetadataField::Language => self.language.as_deref(),
        }
    }
}

/// Metadata fields that can be used as exact-match filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Collection,
    ItemName,
    ItemVersion,
    Category,
    DocType,
    Language,
}

impl MetadataField {
    pub const ALL: [Self; 6] = [
        Self::Collection,
        Self::ItemName,
        Self::ItemVersion,
        Self::Category,
        Self::DocType,
        Self::Language,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::ItemName => "item_name",
            Self::ItemVersion => "item_version",
            Self::Category => "category",
            Self::DocType => "doc_type",
            Self::Language => "language",
        }
    }

    /// Storage column holding this field. Doubles as the filter whitelist.
    pub fn column(&self) -> &'static str {
        self.as_str()
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "collection" | "modpack" => Some(Self::Collection),
            "item_name" | "mod_name" => Some(Self::ItemName),
            "item_version" | "mod_version" => Some(Self::ItemVersion),
            "category" => Some(Self::Category),
            "doc_type" => Some(Self::DocType),
            "language" => Some(Self::Language),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-match filter on one metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub field: MetadataField,
    pub value: String,
}

impl MetadataFilter {
    pub fn new(field: MetadataField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Shorthand for the most common filter, the collection tag.
    pub fn collection(value: impl Into<String>) -> Self {
        Self::new(MetadataField::Collection, value)
    }

    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        metadata.get(self.field) == Some(self.value.as_str())
    }
}

/// A chunk definition as read from a bulk source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChunk {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Option<ChunkMetadata>,
}

/// A unit of ingested knowledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Surrogate id assigned by the store; `None` until saved.
    pub id: Option<i64>,
    pub external_id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Present once an embedding has been computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    pub fn new(external_id: impl Into<String>, text: impl Into<String>) -> DomainResult<Self> {
        let external_id = external_id.into();
        let text = text.into();

        if external_id.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "chunk external id cannot be empty".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(DomainError::ValidationFailed(format!(
                "chunk {external_id} has empty text"
            )));
        }

        Ok(Self {
            id: None,
            external_id,
            text,
            metadata: ChunkMetadata::default(),
            embedding: None,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }
}

impl TryFrom<RawChunk> for Chunk {
    type Error = DomainError;

    fn try_from(raw: RawChunk) -> Result<Self, Self::Error> {
        Ok(Chunk::new(raw.id, raw.text)?.with_metadata(raw.metadata.unwrap_or_default()))
    }
}

/// A chunk returned from a similarity query together with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query vector, in `[-1, 1]`.
    pub similarity: f32,
}

impl ScoredChunk {
    pub fn distance(&self) -> f32 {
        1.0 - self.similarity
    }
}
