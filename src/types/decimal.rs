//! Locale-aware decimal parsing
//!
//! Field values arrive from German and English forms alike. A comma always
//! wins as the decimal mark when present, with any dots read as thousands
//! separators (`"1.234,56"`). Without a comma the dot is the decimal mark.

/// Placeholders the form uses for "no value"
const EMPTY_MARKERS: [&str; 3] = ["", "—", "-"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecimalError {
    #[error("No value given")]
    Empty,

    #[error("Not a number: '{0}'")]
    Malformed(String),

    #[error("Value is not finite: '{0}'")]
    NonFinite(String),
}

/// Parse a decimal string with comma or dot decimal separators
pub fn parse_decimal(raw: &str) -> Result<f64, DecimalError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if EMPTY_MARKERS.contains(&compact.as_str()) {
        return Err(DecimalError::Empty);
    }

    let normalized = if compact.contains(',') {
        compact.replace('.', "").replacen(',', ".", 1)
    } else {
        compact.replace(',', "")
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| DecimalError::Malformed(raw.to_string()))?;

    if !value.is_finite() {
        return Err(DecimalError::NonFinite(raw.to_string()));
    }
    Ok(value)
}

/// Parse an optional field, falling back to `default` when it is absent or blank
pub fn parse_decimal_or(raw: Option<&str>, default: f64) -> Result<f64, DecimalError> {
    match raw.map(parse_decimal) {
        None | Some(Err(DecimalError::Empty)) => Ok(default),
        Some(other) => other,
    }
}

/// Format with a decimal comma, `"—"` for values that are not finite
pub fn format_decimal_de(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    format!("{:.*}", digits, value).replace('.', ",")
}
