use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::value::scalar_to_string;

/// One server row: an untyped field -> value map.
pub type Row = Map<String, Value>;

/// Canonical form of a key-field value.
///
/// The server sends keys as numbers or strings interchangeably, so `1` and
/// `"1"` identify the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Canonicalizes a JSON value. Null, empty strings and composite values
    /// are not keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(_) | Value::Bool(_) => Some(Self(scalar_to_string(value))),
            _ => None,
        }
    }

    /// Reads the key of `row` under `key_field`.
    pub fn of_row(row: &Row, key_field: &str) -> Option<Self> {
        row.get(key_field).and_then(Self::from_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for RecordKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}
