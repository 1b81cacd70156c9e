use std::cmp::Ordering;

use serde_json::Value;
use tabgrid_types::value::{
    flatten_to_string, is_truthy_token, normalize_bool, number_from_value, parse_number,
    parse_timestamp_millis, scalar_to_string,
};
use tabgrid_types::ColumnType;

/// How values of a field are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Date,
    Boolean,
    Text,
}

impl FieldKind {
    pub fn from_type_name(field_type: Option<&str>) -> Self {
        let column_type = field_type.map(ColumnType::from_name).unwrap_or_default();
        if column_type.is_numeric() {
            Self::Numeric
        } else if column_type.is_date() {
            Self::Date
        } else if column_type.is_boolean() {
            Self::Boolean
        } else {
            Self::Text
        }
    }

    fn is_ordered(self) -> bool {
        matches!(self, Self::Numeric | Self::Date)
    }
}

/// A normalized value ready for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    Number(f64),
    Bool(bool),
    /// Lowercased, trimmed text. `Text("")` marks a blank row value.
    Text(String),
}

impl Comparable {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Text form used for substring matching.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => scalar_to_string(&Value::from(*n)),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Normalizes a user-supplied filter value. Blank or unparsable numeric
    /// input yields `None`.
    pub fn from_filter_value(kind: FieldKind, input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match kind {
            FieldKind::Numeric => Self::Number(parse_number(trimmed)?),
            FieldKind::Date => match parse_timestamp_millis(trimmed) {
                Some(millis) => Self::Number(millis as f64),
                None => Self::Text(trimmed.to_lowercase()),
            },
            FieldKind::Boolean => Self::Bool(is_truthy_token(trimmed)),
            FieldKind::Text => Self::Text(trimmed.to_lowercase()),
        })
    }

    /// Normalizes a row cell. Missing or null cells, and numeric cells that
    /// do not parse, yield `None`.
    pub fn from_row_value(kind: FieldKind, value: Option<&Value>) -> Option<Self> {
        let scalar = match value? {
            Value::Null => return None,
            composite @ (Value::Object(_) | Value::Array(_)) => {
                Value::String(flatten_to_string(composite))
            }
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        };
        if scalar.as_str() == Some("") {
            return Some(Self::Text(String::new()));
        }

        match kind {
            FieldKind::Numeric => number_from_value(&scalar).map(Self::Number),
            FieldKind::Date => Some(match &scalar {
                Value::Number(n) => Self::Number(n.as_f64()?),
                other => {
                    let text = scalar_to_string(other);
                    match parse_timestamp_millis(&text) {
                        Some(millis) => Self::Number(millis as f64),
                        None => Self::Text(text.to_lowercase()),
                    }
                }
            }),
            FieldKind::Boolean => Some(Self::Bool(normalize_bool(&scalar))),
            FieldKind::Text => Some(Self::Text(scalar_to_string(&scalar).to_lowercase())),
        }
    }
}

/// Orders two normalized values.
///
/// Numbers only order against numbers on numeric and date fields; a date
/// that failed to parse still orders against other unparsed dates as text.
/// `None` means the pair has no meaningful order.
pub fn compare(a: &Comparable, b: &Comparable, kind: FieldKind) -> Option<Ordering> {
    match (a, b) {
        (Comparable::Number(x), Comparable::Number(y)) => x.partial_cmp(y),
        (Comparable::Bool(x), Comparable::Bool(y)) => Some(x.cmp(y)),
        (Comparable::Text(x), Comparable::Text(y)) => Some(x.cmp(y)),
        _ if kind.is_ordered() => None,
        _ => Some(a.as_text().cmp(&b.as_text())),
    }
}
