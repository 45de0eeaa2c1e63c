use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::{Config, StoreBackend};
use crate::infrastructure::logging::parse_log_level;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".ecoscan";

/// Prefix for environment overrides, e.g. `ECOSCAN_ANALYSIS__MODEL`.
pub const ENV_PREFIX: &str = "ECOSCAN_";

const MAX_RETRIES_LIMIT: u32 = 3;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("analysis.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("analysis.model cannot be empty")]
    EmptyModel,

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid timeout_secs: {0}. Must be between 1 and {MAX_TIMEOUT_SECS}")]
    InvalidTimeout(u64),

    #[error("Invalid max_retries: {0}. Must be at most {MAX_RETRIES_LIMIT}")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("store.path cannot be empty for the sqlite backend")]
    EmptyStorePath,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. .ecoscan/config.yaml
    /// 3. .ecoscan/local.yaml
    /// 4. Environment variables (`ECOSCAN_*`, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        let dir = Path::new(CONFIG_DIR);
        Self::load_layered(&[dir.join("config.yaml"), dir.join("local.yaml")])
    }

    /// Load with `path` in place of the project files; the environment still
    /// overrides it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::load_layered(&[path.to_path_buf()])
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn load_layered(files: &[PathBuf]) -> Result<Config> {
        let figment = files.iter().fold(
            Figment::new().merge(Serialized::defaults(Config::default())),
            |figment, file| figment.merge(Yaml::file(file)),
        );

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let analysis = &config.analysis;
        if analysis.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if analysis.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if analysis.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(analysis.max_tokens));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&analysis.timeout_secs) {
            return Err(ConfigError::InvalidTimeout(analysis.timeout_secs));
        }

        let retry = &config.retry;
        if retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::InvalidMaxRetries(retry.max_retries));
        }
        if retry.initial_backoff_ms > retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                retry.initial_backoff_ms,
                retry.max_backoff_ms,
            ));
        }

        if parse_log_level(&config.logging.level).is_err() {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.store.backend == StoreBackend::Sqlite && config.store.path.trim().is_empty() {
            return Err(ConfigError::EmptyStorePath);
        }

        Ok(())
    }
}
