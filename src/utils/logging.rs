//! Logging configuration and subscriber setup

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;
use crate::ports::LogLevel;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> Result<Self, DomainError> {
        match format.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(DomainError::BadArgs(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Global log level, overridden by `RUST_LOG` directives
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
        }
    }
}

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl LoggingSystem {
    /// Create a new logging system with configuration
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Filter from `RUST_LOG` when set, else from the configured level
    fn env_filter(&self) -> EnvFilter {
        match std::env::var("RUST_LOG") {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
            _ => EnvFilter::new(self.config.level.as_str()),
        }
    }

    /// Install the global subscriber; all output goes to stderr.
    ///
    /// Installing twice is not an error, the first subscriber stays.
    pub fn initialize(&self) -> Result<(), DomainError> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr);

        let installed = match self.config.format {
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Compact => builder.compact().with_target(false).try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if let Err(e) = installed {
            tracing::debug!("tracing subscriber already installed: {}", e);
        }

        tracing::debug!(
            level = self.config.level.as_str(),
            format = %self.config.format,
            "logging initialized"
        );
        Ok(())
    }

    /// Log version and platform
    pub fn log_system_info(&self) {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            os = std::env::consts::OS,
            "ripcas starting"
        );
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}
