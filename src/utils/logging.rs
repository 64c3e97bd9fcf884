//! Logging configuration and subscriber setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
}

/// Logging configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include target module information
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            target: false,
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

    /// Build the env filter; `RUST_LOG` takes precedence over the configured level
    fn env_filter(&self) -> Result<EnvFilter, DomainError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.config.level).map_err(|e| {
            DomainError::Config(format!("Invalid log level '{}': {}", self.config.level, e))
        })
    }

    /// Install the global subscriber. Logs go to stderr.
    ///
    /// Calling this twice is harmless: the second install is ignored.
    pub fn initialize(&self) -> Result<(), DomainError> {
        let filter = self.env_filter()?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.config.target)
            .with_writer(std::io::stderr);

        let installed = match self.config.format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if installed.is_err() {
            tracing::debug!("Global tracing subscriber already installed");
        }

        Ok(())
    }

    /// Log build and platform information
    pub fn log_system_info(&self) {
        tracing::debug!(
            version = env!("CARGO_PKG_VERSION"),
            os = std::env::consts::OS,
            level = %self.config.level,
            format = ?self.config.format,
            "clipfetch starting"
        );
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}
