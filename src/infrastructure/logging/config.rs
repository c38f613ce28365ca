use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Runtime logging configuration, resolved from the `logging` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stderr)
    pub log_dir: Option<PathBuf>,

    /// Log rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("Invalid log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

impl LogConfig {
    /// Resolve from the loaded configuration. An unknown format falls back to
    /// pretty; `ConfigLoader::validate` rejects it earlier on the normal path.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or(LogFormat::Pretty),
            log_dir: settings.log_dir.as_ref().map(PathBuf::from),
            rotation: RotationPolicy::Daily,
        }
    }

    /// Same settings with the level forced to `debug` (the `--verbose` flag).
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.level = "debug".to_string();
        self
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            level: "warn".to_string(),
            format: "JSON".to_string(),
            log_dir: Some("/tmp/ragkeeper-logs".to_string()),
        };

        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/ragkeeper-logs")));
        assert_eq!(config.verbose().level, "debug");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
