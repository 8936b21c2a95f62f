//! Validation utilities for configuration values

use validator::ValidationError;

/// Currency codes the report formatter has symbols for, plus any ISO-style
/// three-letter code the backend may send. Unknown codes render as "$" at
/// format time, but configuration should stick to the supported table.
const SUPPORTED_CURRENCIES: &[&str] = &["usd", "eur", "gbp", "cad"];

/// Validate a log level string
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate a currency code against the supported symbol table
pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::new("empty_currency_code"));
    }

    if SUPPORTED_CURRENCIES.contains(&code.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_currency_code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("trace").is_ok());
        assert!(validate_log_level("debug").is_ok());
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("warn").is_ok());
        assert!(validate_log_level("error").is_ok());

        assert!(validate_log_level("").is_err());
        assert!(validate_log_level("verbose").is_err());
        assert!(validate_log_level("INFO").is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("usd").is_ok());
        assert!(validate_currency_code("eur").is_ok());
        assert!(validate_currency_code("gbp").is_ok());
        assert!(validate_currency_code("cad").is_ok());
        assert!(validate_currency_code("USD").is_ok()); // case-insensitive

        assert!(validate_currency_code("").is_err());
        assert!(validate_currency_code("doge").is_err());
    }
}
