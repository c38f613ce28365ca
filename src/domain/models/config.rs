use serde::{Deserialize, Serialize};

use super::embedding::{EmbeddingProviderKind, DEFAULT_EMBEDDING_DIMENSION};

/// Main configuration structure for ragkeeper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retrieval and ingestion settings
    #[serde(default)]
    pub rag: RagConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Prompt persona settings
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".ragkeeper/ragkeeper.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Retrieval and ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RagConfig {
    /// Gates retrieval and availability
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Retrieval fan-out when the caller does not specify one
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Minimum cosine similarity for threshold-mode queries
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Ingestion batch width
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between ingestion batches
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Pause between items inside a batch
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Run ingestion automatically at process start
    #[serde(default)]
    pub auto_load_on_start: bool,

    /// Bulk chunk source used by auto-load
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

const fn default_true() -> bool {
    true
}

const fn default_top_k() -> usize {
    5
}

const fn default_similarity_threshold() -> f32 {
    0.7
}

const fn default_batch_size() -> usize {
    10
}

const fn default_inter_batch_delay_ms() -> u64 {
    1000
}

const fn default_item_delay_ms() -> u64 {
    100
}

fn default_data_file() -> String {
    "data.json".to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            default_top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            batch_size: default_batch_size(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            item_delay_ms: default_item_delay_ms(),
            auto_load_on_start: false,
            data_file: default_data_file(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Which backend to use
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// API key. Falls back to the provider's env var when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the provider's base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Override for the provider's default model
    #[serde(default)]
    pub model: Option<String>,

    /// Expected vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_dimension() -> usize {
    DEFAULT_EMBEDDING_DIMENSION
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            api_key: None,
            base_url: None,
            model: None,
            dimension: default_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

/// Persona used when composing prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptConfig {
    /// Subject the assistant specializes in
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Header label for the collection tag in rendered context
    #[serde(default = "default_collection_label")]
    pub collection_label: String,

    /// Header label for the item name in rendered context
    #[serde(default = "default_item_label")]
    pub item_label: String,

    /// Areas of expertise listed in the fallback prompt
    #[serde(default = "default_fallback_topics")]
    pub fallback_topics: Vec<String>,
}

fn default_domain() -> String {
    "Minecraft".to_string()
}

fn default_collection_label() -> String {
    "Modpack".to_string()
}

fn default_item_label() -> String {
    "Mod".to_string()
}

fn default_fallback_topics() -> Vec<String> {
    [
        "Minecraft gameplay, mechanics, and strategies",
        "Modpacks, mods, and mod configurations",
        "Building techniques and redstone circuits",
        "Server setup and administration",
        "Game updates and features",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            collection_label: default_collection_label(),
            item_label: default_item_label(),
            fallback_topics: default_fallback_topics(),
        }
    }
}
