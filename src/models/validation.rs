//! Parsing and checks for values typed into attribute editors.

use serde_json::Value;
use crate::constants::{Z_INDEX_MAX, Z_INDEX_MIN};

/// Parse a coordinate field
///
/// # Errors
///
/// Returns an error if the text is not a finite number
pub fn parse_coordinate(input: &str) -> Result<f64, String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("Not a number: {input}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("Coordinate must be finite: {input}"))
    }
}

/// Parse a z-index field, clamped to the allowed range
///
/// # Errors
///
/// Returns an error if the text is not an integer
pub fn parse_z_index(input: &str) -> Result<i32, String> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| format!("Not an integer: {input}"))?;
    let clamped = value.clamp(i64::from(Z_INDEX_MIN), i64::from(Z_INDEX_MAX));
    i32::try_from(clamped).map_err(|e| e.to_string())
}

/// `#rgb` or `#rrggbb` hex colour
#[must_use]
pub fn is_valid_color(input: &str) -> bool {
    input
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Check that every `#`-prefixed string in a style or node payload is a colour
///
/// # Errors
///
/// Returns an error naming the first malformed colour
pub fn check_payload_colors(payload: &Value) -> Result<(), String> {
    match payload {
        Value::String(text) if text.starts_with('#') && !is_valid_color(text) => {
            Err(format!("Invalid colour: {text}"))
        }
        Value::Array(items) => items.iter().try_for_each(check_payload_colors),
        Value::Object(fields) => fields.values().try_for_each(check_payload_colors),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(" 12.5 "), Ok(12.5));
        assert_eq!(parse_coordinate("-3"), Ok(-3.0));
        assert!(parse_coordinate("abc").is_err());
        assert!(parse_coordinate("inf").is_err());
        assert!(parse_coordinate("NaN").is_err());
    }

    #[test]
    fn test_parse_z_index_clamps() {
        assert_eq!(parse_z_index("4"), Ok(4));
        assert_eq!(parse_z_index("15"), Ok(10));
        assert_eq!(parse_z_index("-99999999999"), Ok(-10));
        assert!(parse_z_index("1.5").is_err());
    }

    #[test]
    fn test_is_valid_color() {
        assert!(is_valid_color("#E4002B"));
        assert!(is_valid_color("#fff"));
        assert!(!is_valid_color("E4002B"));
        assert!(!is_valid_color("#12345"));
        assert!(!is_valid_color("#ggg"));
    }

    #[test]
    fn test_payload_colors() {
        let good = serde_json::json!({ "color": ["shanghai", "sh1", "#E4002B", "#fff"], "width": 20 });
        assert!(check_payload_colors(&good).is_ok());
        let bad = serde_json::json!({ "colorA": ["shanghai", "sh1", "#E400", "#fff"] });
        assert_eq!(check_payload_colors(&bad), Err("Invalid colour: #E400".to_string()));
    }
}
