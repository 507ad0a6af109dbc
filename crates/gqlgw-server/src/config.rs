//! Configuration management for the gateway.
//!
//! Configuration is loaded from three sources, later ones winning:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (`GQLGW_` prefix, `__` nested separator)
//!
//! # Example
//!
//! ```ignore
//! use gqlgw_server::config::GatewayConfig;
//!
//! // Load from file with env overrides
//! let config = GatewayConfig::load("config.yaml")?;
//!
//! // Or load from environment only
//! let config = GatewayConfig::from_env()?;
//! ```
//!
//! Environment variable examples:
//! - `GQLGW_GATEWAY__BATCH_LIMIT=25`
//! - `GQLGW_GATEWAY__DEBUG=true`
//! - `GQLGW_SERVER__PORT=9000`

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::handlers::batch::{GatewayOptions, DEFAULT_BATCH_LIMIT};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct GatewayConfig {
    /// Network settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Pipeline settings
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024
}

/// Pipeline settings.
///
/// Environment variable overrides use the `GQLGW_` prefix:
/// `GQLGW_GATEWAY__SCHEMA=catalog`, `GQLGW_GATEWAY__BATCH_LIMIT=25`,
/// `GQLGW_GATEWAY__AUTOBUILD=true`, `GQLGW_GATEWAY__DEBUG=true`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GatewaySettings {
    /// Engine backend. Only `memory` is built in; real engines are wired
    /// by embedding the crates directly.
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Default schema key served by the gateway.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Maximum operations per request.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Build missing schemas on demand.
    #[serde(default)]
    pub autobuild: bool,

    /// Include code/file/line/trace in operation failure payloads.
    /// Never enable in production.
    #[serde(default)]
    pub debug: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            schema: default_schema(),
            batch_limit: default_batch_limit(),
            autobuild: false,
            debug: false,
        }
    }
}

impl GatewaySettings {
    /// Pipeline options derived from this configuration.
    pub fn options(&self) -> GatewayOptions {
        GatewayOptions {
            batch_limit: self.batch_limit,
            autobuild: self.autobuild,
            debug: self.debug,
        }
    }
}

fn default_engine() -> String {
    "memory".to_string()
}

fn default_schema() -> String {
    "default".to_string()
}

fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level if RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine backends the binary knows how to wire.
const KNOWN_ENGINES: &[&str] = &["memory"];

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl GatewayConfig {
    /// Loads configuration from a YAML file with environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.display().to_string()));
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(
                Environment::with_prefix("GQLGW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let settings = Config::builder()
            .add_source(
                Environment::with_prefix("GQLGW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would misbehave at runtime.
    ///
    /// A zero batch limit would turn every non-empty request into a
    /// batch-limit rejection, so misconfiguration fails here at startup
    /// rather than per-request.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Invalid(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.gateway.batch_limit == 0 {
            return Err(ConfigLoadError::Invalid(
                "gateway.batch_limit must be at least 1".to_string(),
            ));
        }
        if !KNOWN_ENGINES.contains(&self.gateway.engine.as_str()) {
            return Err(ConfigLoadError::Invalid(format!(
                "unknown engine backend: {}",
                self.gateway.engine
            )));
        }
        if !KNOWN_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
