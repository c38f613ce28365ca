//! Embedding domain models
//!
//! Provider selection, the outcome of a single embedding request, and the
//! vector math used for similarity ranking.

use serde::{Deserialize, Serialize};

/// Maximum number of characters submitted to a provider per request.
pub const MAX_EMBEDDING_INPUT_CHARS: usize = 10_000;

/// Default embedding dimension (Gemini `text-embedding-004`).
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Embedding backends, selected once at startup from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// Google Gemini `embedContent` API
    #[default]
    Gemini,
    /// OpenAI-compatible `/embeddings` API
    #[serde(rename = "openai", alias = "open_ai")]
    OpenAi,
    /// Produces no embeddings; every request degrades to `NoEmbedding`
    Null,
}

impl EmbeddingProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Null => "null",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "text-embedding-004",
            Self::OpenAi => "text-embedding-3-small",
            Self::Null => "none",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Null => "",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Null => None,
        }
    }
}

impl std::fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking for one embedding.
///
/// `NoEmbedding` is expected degradation (blank input, empty or malformed
/// vector); `Fault` is a transport or remote failure. Neither unwinds the
/// caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingOutcome {
    Embedded(Vec<f32>),
    NoEmbedding(String),
    Fault(String),
}

impl EmbeddingOutcome {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// The vector, if one was produced.
    pub fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            Self::Embedded(v) => Some(v),
            Self::NoEmbedding(_) | Self::Fault(_) => None,
        }
    }

    /// Human-readable reason for a missing vector.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Embedded(_) => None,
            Self::NoEmbedding(reason) | Self::Fault(reason) => Some(reason),
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Returns `None` for mismatched lengths, a zero-magnitude operand or a
/// non-finite result. Sums are kept in `f64` so large components cannot
/// overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return None;
    }

    #[allow(clippy::cast_possible_truncation)]
    Some(similarity.clamp(-1.0, 1.0) as f32)
}

/// Cosine distance (`1 - similarity`); `f32::MAX` when undefined.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity(a, b).map_or(f32::MAX, |s| 1.0 - s)
}

/// Render a vector as `[0.1,0.2,0.3]`.
pub fn to_vector_literal(embedding: &[f32]) -> Option<String> {
    if embedding.is_empty() {
        return None;
    }
    let body = embedding
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("[{body}]"))
}
