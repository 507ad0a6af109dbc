//! Structured logging configuration.
//!
//! JSON output is intended for production deployments where logs are
//! shipped to an aggregator; the text formatter is for development. The
//! `RUST_LOG` environment variable overrides the configured default
//! level.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to use JSON format (true) or text format (false)
    pub json_format: bool,
    /// The default log level if RUST_LOG is not set
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    /// JSON output for production.
    pub fn json() -> Self {
        Self {
            json_format: true,
            ..Default::default()
        }
    }

    /// Text output for development.
    pub fn text() -> Self {
        Self::default()
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }
}

/// Initialize the logging subsystem.
///
/// Should be called once at startup; subsequent calls have no effect
/// because the subscriber is global.
pub fn init_logging(config: LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    if config.json_format {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default_is_text_info() {
        let config = LoggingConfig::default();
        assert!(!config.json_format);
        assert_eq!(config.default_level, Level::INFO);
    }

    #[test]
    fn test_logging_config_json() {
        assert!(LoggingConfig::json().json_format);
    }

    #[test]
    fn test_logging_config_with_level() {
        let config = LoggingConfig::text().with_level(Level::DEBUG);
        assert_eq!(config.default_level, Level::DEBUG);
    }
}
