//! Common utilities and types for the finsight reporting backend

pub mod api;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use api::{ApiClient, ApiConfig, ApiEnvelope};
pub use error::{FinsightError, Result};
pub use logging::{
    init_default_logging, init_dev_logging, init_logging, init_prod_logging, LoggingConfig,
};
