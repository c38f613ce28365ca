use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::EmbeddingProviderKind;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".ragkeeper";

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "RAGKEEPER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid default_top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid similarity_threshold: {0}. Must be between -1.0 and 1.0")]
    InvalidSimilarityThreshold(f32),

    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("Invalid embedding timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .ragkeeper/config.yaml (project config)
    /// 3. .ragkeeper/local.yaml (project local overrides, optional)
    /// 4. Environment variables (RAGKEEPER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same layering as [`ConfigLoader::load`], rooted at `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Self::figment(dir)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(dir: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.rag.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.rag.batch_size));
        }

        if config.rag.default_top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.rag.default_top_k));
        }

        let threshold = config.rag.similarity_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidSimilarityThreshold(threshold));
        }

        if config.rag.auto_load_on_start && config.rag.data_file.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "rag.data_file cannot be empty when auto_load_on_start is enabled".to_string(),
            ));
        }

        if config.embedding.provider != EmbeddingProviderKind::Null {
            if config.embedding.dimension == 0 {
                return Err(ConfigError::InvalidDimension(config.embedding.dimension));
            }
            if config.embedding.timeout_secs == 0 {
                return Err(ConfigError::InvalidTimeout(config.embedding.timeout_secs));
            }
        }

        Ok(())
    }
}
