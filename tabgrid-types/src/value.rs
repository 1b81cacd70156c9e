//! Lenient scalar parsing for server-supplied JSON values.
//!
//! The server sends numbers as JSON numbers or as strings (sometimes with a
//! comma decimal separator), booleans as `1`/`"Y"`/`"true"`, and dates in a
//! handful of textual layouts. These helpers normalize all of them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Tokens treated as `true` when a boolean arrives as a string.
pub const TRUTHY_TOKENS: [&str; 4] = ["1", "true", "y", "yes"];

const NAIVE_DATETIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the longest numeric prefix of `input`, accepting a comma as the
/// decimal separator (only the first comma is replaced).
///
/// `"12,5 kg"` parses as `12.5`; `"abc"` yields `None`.
pub fn parse_number(input: &str) -> Option<f64> {
    let normalized = input.trim().replacen(',', ".", 1);
    let bytes = normalized.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    normalized[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reads a number from a JSON number or a numeric string.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Reads a non-negative whole number from a JSON number or a string that is
/// entirely numeric. Used for pager fields, where partial garbage must be
/// rejected rather than truncated.
pub fn count_from_value(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.is_finite() && number >= 0.0 {
        Some(number.trunc() as u64)
    } else {
        None
    }
}

/// Returns whether a string is one of the [`TRUTHY_TOKENS`] (case-insensitive).
pub fn is_truthy_token(token: &str) -> bool {
    let lowered = token.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&lowered.as_str())
}

/// Normalizes a loosely typed boolean.
pub fn normalize_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => is_truthy_token(s),
        _ => false,
    }
}

/// Null, blank strings, empty arrays and empty objects are empty.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Stringifies a scalar the way it would be shown in a cell.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Collapses a composite value into one scalar string: objects yield their
/// `value`, then `name`, then all members joined by spaces; arrays are joined
/// by spaces.
pub fn flatten_to_string(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                flatten_to_string(inner)
            } else if let Some(inner) = map.get("name") {
                flatten_to_string(inner)
            } else {
                map.values()
                    .map(flatten_to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
        Value::Array(items) => items
            .iter()
            .map(flatten_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        scalar => scalar_to_string(scalar),
    }
}

/// Lowercased, trimmed text used for substring/prefix/suffix matching.
pub fn searchable_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => flatten_to_string(v).trim().to_lowercase(),
    }
}

/// Parses a date or date-time string into epoch milliseconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]`.
/// Values without an offset are read as UTC.
pub fn parse_timestamp_millis(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    for layout in NAIVE_DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
