use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::value::{count_from_value, normalize_bool};

/// Closed set of column types the renderer and filter layer understand.
///
/// Server type names are free-form strings; [`ColumnType::from_name`] maps
/// them (case-insensitively, with aliases) onto this enum. Anything
/// unrecognized becomes [`ColumnType::Text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    #[default]
    Text,
    Boolean,
    Integer,
    Number,
    Money,
    Date,
    DateTime,
    Time,
    File,
    Image,
    Value,
    Textbox,
    Html,
    Hidden,
}

impl ColumnType {
    /// Resolves a server type name. Never fails: unknown names map to `Text`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "boolean" | "checkbox" | "bool" => Self::Boolean,
            "int" | "integer" => Self::Integer,
            "number" | "float" | "double" | "numeric" | "decimal" => Self::Number,
            "money" | "currency" => Self::Money,
            "date" => Self::Date,
            "datetime" | "timestamp" => Self::DateTime,
            "time" => Self::Time,
            "file" => Self::File,
            "image" => Self::Image,
            "value" => Self::Value,
            "textbox" => Self::Textbox,
            "html" | "htmlblock" => Self::Html,
            "hidden" => Self::Hidden,
            _ => Self::Text,
        }
    }

    /// Integer, number and money columns.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number | Self::Money)
    }

    /// Date, date-time and time columns.
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }

    pub fn is_boolean(self) -> bool {
        self == Self::Boolean
    }
}

/// Server-declared description of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw server type name (e.g. `"int"`, `"datetime"`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Only an explicit false-ish value hides a field.
    #[serde(default = "default_visible", deserialize_with = "visible_flag")]
    pub visible: bool,
    #[serde(rename = "sort", default, deserialize_with = "loose_flag")]
    pub sortable: bool,
    /// Marks the record-key field.
    #[serde(default, deserialize_with = "loose_flag")]
    pub key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, deserialize_with = "loose_count", skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(
        rename = "minWidth",
        default,
        deserialize_with = "loose_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_width: Option<u32>,
    #[serde(
        rename = "maxWidth",
        default,
        deserialize_with = "loose_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_width: Option<u32>,
    #[serde(rename = "cssClass", default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default, deserialize_with = "loose_count", skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, deserialize_with = "loose_count", skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            title: None,
            field_type: None,
            visible: true,
            sortable: false,
            key: false,
            tooltip: None,
            align: None,
            width: None,
            min_width: None,
            max_width: None,
            css_class: None,
            precision: None,
            scale: None,
        }
    }
}

impl FieldMeta {
    /// Shorthand for a field of the given server type.
    pub fn typed(field_type: &str) -> Self {
        Self {
            field_type: Some(field_type.to_string()),
            ..Self::default()
        }
    }

    /// Shorthand for the record-key field.
    pub fn key(field_type: &str) -> Self {
        Self {
            key: true,
            ..Self::typed(field_type)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// The resolved column type.
    pub fn column_type(&self) -> ColumnType {
        self.field_type
            .as_deref()
            .map(ColumnType::from_name)
            .unwrap_or_default()
    }

    /// Lowercased raw type name, empty when absent.
    pub fn type_name(&self) -> String {
        self.field_type
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default()
    }
}

fn default_visible() -> bool {
    true
}

fn visible_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => true,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            !matches!(lowered.as_str(), "0" | "false" | "n" | "no")
        }
        _ => true,
    })
}

fn loose_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_bool(&value))
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value).and_then(|n| u32::try_from(n).ok()))
}

/// Ordered map of field name to [`FieldMeta`], as declared by the server.
///
/// Declaration order is preserved: it drives column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMetadata(IndexMap<String, FieldMeta>);

impl ColumnMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, keeping declaration order.
    pub fn with_field(mut self, name: impl Into<String>, meta: FieldMeta) -> Self {
        self.0.insert(name.into(), meta);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, meta: FieldMeta) -> Option<FieldMeta> {
        self.0.insert(name.into(), meta)
    }

    pub fn get(&self, name: &str) -> Option<&FieldMeta> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldMeta)> {
        self.0.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The record-key field. If several fields claim `key`, the first in
    /// declaration order wins.
    pub fn key_field(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, meta)| meta.key)
            .map(|(name, _)| name.as_str())
    }

    /// Decodes metadata from a loosely shaped JSON value.
    ///
    /// An object is decoded field by field; `null` and empty arrays (the
    /// server's encoding of an empty map) mean "no metadata".
    pub fn from_value(value: &Value) -> crate::Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) if items.is_empty() => Ok(None),
            Value::Object(_) => Ok(Some(serde_json::from_value(value.clone())?)),
            other => Err(crate::Error::MalformedEnvelope(format!(
                "meta must be an object, got {}",
                json_kind(other)
            ))),
        }
    }
}

impl FromIterator<(String, FieldMeta)> for ColumnMetadata {
    fn from_iter<I: IntoIterator<Item = (String, FieldMeta)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
