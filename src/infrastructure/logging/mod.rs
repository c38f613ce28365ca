//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console formatting on stderr
//! - Rolling JSON log files
//! - Secret scrubbing for provider credentials

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::{parse_log_level, LoggerImpl};
pub use secret_scrubbing::{scrub_secrets, SecretScrubber};
