//! Configuration loading utilities

use crate::Config;
use finsight_common::Result as FinsightResult;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for finsight_common::FinsightError {
    fn from(err: ConfigError) -> Self {
        finsight_common::FinsightError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!("Loading configuration from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;

        config.validate_all().map_err(ConfigError::ValidationError)?;

        info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration from environment variables and files
    ///
    /// Resolution order: `FINSIGHT_CONFIG_PATH`, then `config.yaml` or
    /// `config.yml` in the working directory, then built-in defaults with
    /// environment overrides applied.
    pub fn load() -> FinsightResult<Config> {
        let config = if let Ok(config_path) = env::var("FINSIGHT_CONFIG_PATH") {
            Self::load_config(&config_path)?
        } else if Path::new("config.yaml").exists() {
            Self::load_config("config.yaml")?
        } else if Path::new("config.yml").exists() {
            Self::load_config("config.yml")?
        } else {
            debug!("No configuration file found, using defaults with environment overrides");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config).map_err(finsight_common::FinsightError::from)?;
            config
                .validate_all()
                .map_err(|e| ConfigError::ValidationError(e))
                .map_err(finsight_common::FinsightError::from)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> FinsightResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        // API configuration overrides
        if let Ok(url) = env::var("FINSIGHT_API_URL") {
            config.api.base_url = url;
        }

        if let Ok(token) = env::var("FINSIGHT_API_TOKEN") {
            config.api.api_token = token;
        }

        if let Ok(timeout) = env::var("FINSIGHT_API_TIMEOUT") {
            config.api.timeout_seconds =
                timeout.parse().map_err(|e| ConfigError::EnvParseError {
                    var: "FINSIGHT_API_TIMEOUT".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Ok(retries) = env::var("FINSIGHT_API_MAX_RETRIES") {
            config.api.max_retries = retries.parse().map_err(|e| ConfigError::EnvParseError {
                var: "FINSIGHT_API_MAX_RETRIES".to_string(),
                source: Box::new(e),
            })?;
        }

        // Refresh configuration overrides
        if let Ok(enabled) = env::var("FINSIGHT_REFRESH_ENABLED") {
            config.refresh.enabled = enabled.parse().map_err(|e| ConfigError::EnvParseError {
                var: "FINSIGHT_REFRESH_ENABLED".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(interval) = env::var("FINSIGHT_REFRESH_INTERVAL") {
            config.refresh.interval_seconds =
                interval.parse().map_err(|e| ConfigError::EnvParseError {
                    var: "FINSIGHT_REFRESH_INTERVAL".to_string(),
                    source: Box::new(e),
                })?;
        }

        // Report configuration overrides
        if let Ok(title) = env::var("FINSIGHT_REPORT_TITLE") {
            config.report.title = title;
        }

        if let Ok(currency) = env::var("FINSIGHT_REPORT_CURRENCY") {
            config.report.currency = currency;
        }

        // Logging configuration overrides
        if let Ok(level) = env::var("FINSIGHT_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("FINSIGHT_LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}
