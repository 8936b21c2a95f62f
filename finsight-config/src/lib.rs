//! Configuration management for the finsight reporting backend

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{ApiSettings, Config, LoggingSettings, RefreshSettings, ReportSettings};
