//! Layered server configuration
//!
//! Sources, later ones overriding earlier ones: built-in defaults, an optional
//! YAML or TOML file, then environment variables prefixed `RELATION_TUPLES_`
//! with `__` between nested keys (e.g. `RELATION_TUPLES_READ__EXPANSION_ROUNDS`).

use config::{Config, Environment, File};
use relation_tuples::{ReadOptions, DEFAULT_PAGE_SIZE};
use relation_tuples::expand::EXPANSION_ROUNDS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, ApiResult};

pub const ENV_PREFIX: &str = "RELATION_TUPLES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log: LogConfig,
    pub read: ReadConfig,
    pub seed: SeedConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4466,
            log: LogConfig::default(),
            read: ReadConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Fallback filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    pub default_page_size: i64,
    pub expansion_rounds: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            expansion_rounds: EXPANSION_ROUNDS,
        }
    }
}

impl From<ReadConfig> for ReadOptions {
    fn from(config: ReadConfig) -> Self {
        Self {
            default_page_size: config.default_page_size,
            expansion_rounds: config.expansion_rounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Tuples to preload into the in-memory store, one per line
    pub file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load defaults, then `path` when given, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when a source cannot be read or
    /// the merged result fails validation.
    pub fn load(path: Option<&Path>) -> ApiResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ApiError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] naming the offending key.
    pub fn validate(&self) -> ApiResult<()> {
        if self.read.expansion_rounds < 1 {
            return Err(ApiError::configuration("read.expansion_rounds must be at least 1"));
        }
        if self.read.default_page_size < 1 {
            return Err(ApiError::configuration("read.default_page_size must be positive"));
        }
        if self.host.is_empty() {
            return Err(ApiError::configuration("host must not be empty"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
