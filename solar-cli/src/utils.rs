use rust_decimal::Decimal;
use solar_core::models::percent_to_fraction;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid number '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and drops `_` and `,` digit-group separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '_'], "")
}

/// Parses a command-line number into a [`Decimal`].
///
/// Accepts `,` or `_` as thousands separators (`"83,000,000"`, `"83_000_000"`).
/// Empty input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a percentage (`"8"`, `"8%"`) into the fraction the backend expects (`0.08`).
pub fn parse_percent(s: &str) -> Result<Decimal, ParseDecimalError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_decimal(number).map(percent_to_fraction)
}
