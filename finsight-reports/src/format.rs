//! Formatting helpers for report presentation

use chrono::{DateTime, Utc};

/// Placeholder rendered for absent dates
pub const MISSING_DATE_PLACEHOLDER: &str = "N/A";

/// Currency symbol for a lowercase currency code
///
/// Unknown codes default to "$". The symbol is a pure prefix; no value
/// scaling is ever applied.
pub fn currency_symbol(code: &str) -> &'static str {
    match code.to_ascii_lowercase().as_str() {
        "usd" => "$",
        "eur" => "€",
        "gbp" => "£",
        "cad" => "C$",
        _ => "$",
    }
}

/// Format an amount with its currency symbol and two fixed decimal places
pub fn format_currency(amount: f64, code: &str) -> String {
    format!("{}{:.2}", currency_symbol(code), amount)
}

/// Long-form date rendering, with a literal placeholder for absent dates
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => MISSING_DATE_PLACEHOLDER.to_string(),
    }
}
