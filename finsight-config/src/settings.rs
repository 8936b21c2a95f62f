//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Platform API configuration
    #[validate]
    pub api: ApiSettings,

    /// Periodic refresh configuration
    #[validate]
    pub refresh: RefreshSettings,

    /// Report defaults
    #[validate]
    pub report: ReportSettings,

    /// Logging configuration
    #[validate]
    pub logging: LoggingSettings,
}

/// Platform API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiSettings {
    /// Platform backend base URL
    #[validate(url(message = "API base URL must be a valid URL"))]
    pub base_url: String,

    /// Bearer token for authentication
    #[validate(length(min = 1, message = "API token cannot be empty"))]
    pub api_token: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum number of retries for failed requests
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: u32,

    /// Rate limit in requests per second
    #[validate(range(min = 1, max = 100, message = "Rate limit must be between 1 and 100"))]
    pub rate_limit_per_sec: u32,
}

/// Periodic refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshSettings {
    /// Whether periodic background refresh is enabled
    pub enabled: bool,

    /// Refresh interval in seconds
    #[validate(range(min = 1, max = 3600, message = "Refresh interval must be between 1 and 3600 seconds"))]
    pub interval_seconds: u64,
}

/// Report defaults applied when the caller does not override them
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportSettings {
    /// Report title
    #[validate(length(min = 1, message = "Report title cannot be empty"))]
    pub title: String,

    /// Optional subtitle line
    pub subtitle: Option<String>,

    /// Currency code used for revenue formatting (e.g., "usd")
    #[validate(custom(function = "crate::validation::validate_currency_code", message = "Unsupported currency code"))]
    pub currency: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Whether to use colored output (for console logging)
    pub colored: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            refresh: RefreshSettings::default(),
            report: ReportSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_token: String::new(),
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_per_sec: 10,
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 60,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Platform Report".to_string(),
            subtitle: None,
            currency: "usd".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            colored: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_structurally_valid() {
        let config = Config::default();
        // The default token is empty, so only the api section should fail.
        let result = config.validate_all();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.errors().contains_key("api"));
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = Config::default();
        config.api.api_token = "secret".to_string();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = Config::default();
        config.api.api_token = "secret".to_string();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.api.api_token = "secret".to_string();
        config.logging.level = "verbose".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_invalid_currency_rejected() {
        let mut config = Config::default();
        config.api.api_token = "secret".to_string();
        config.report.currency = "doge".to_string();
        assert!(config.validate_all().is_err());
    }
}
