use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter condition vocabulary, parsed case-insensitively with aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FilterCondition {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Between,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Empty,
    NotEmpty,
    /// Boolean field is true.
    Checked,
    /// Boolean field is not true.
    Unchecked,
    /// Unrecognized name; evaluated as equality against the first value.
    Other(String),
}

impl FilterCondition {
    pub fn parse(name: &str) -> Self {
        let lowered = name.trim().to_lowercase();
        match lowered.as_str() {
            "equal" | "=" | "eq" => Self::Equal,
            "notequal" | "!=" | "neq" => Self::NotEqual,
            "greater" | ">" | "gt" => Self::Greater,
            "greaterorequal" | ">=" | "gte" => Self::GreaterOrEqual,
            "less" | "<" | "lt" => Self::Less,
            "lessorequal" | "<=" | "lte" => Self::LessOrEqual,
            "between" => Self::Between,
            "like" | "contains" | "substring" => Self::Contains,
            "notlike" | "not contains" | "notcontains" => Self::NotContains,
            "begins" | "startswith" | "starts" => Self::StartsWith,
            "ends" | "endswith" => Self::EndsWith,
            "in" => Self::In,
            "notin" | "not in" => Self::NotIn,
            "empty" | "isnull" | "null" => Self::Empty,
            "notempty" | "notnull" => Self::NotEmpty,
            "checked" => Self::Checked,
            "unchecked" => Self::Unchecked,
            _ => Self::Other(lowered),
        }
    }

    /// Conditions that are meaningful without any comparison value.
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            Self::Empty | Self::NotEmpty | Self::Checked | Self::Unchecked
        )
    }

    /// Name understood by the legacy server filter (`filter[condition]=`).
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Between => "between",
            Self::Contains => "like",
            Self::NotContains => "notlike",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::Empty => "empty",
            Self::NotEmpty => "notempty",
            Self::Checked => "checked",
            Self::Unchecked => "unchecked",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl From<String> for FilterCondition {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FilterCondition> for String {
    fn from(value: FilterCondition) -> Self {
        value.as_wire().to_string()
    }
}

/// One structured per-field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub field: String,
    pub condition: FilterCondition,
    #[serde(default)]
    pub values: Vec<String>,
    /// Raw server type of `field`; drives comparison semantics.
    #[serde(rename = "fieldType", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl FilterDescriptor {
    pub fn new<I, S>(field: impl Into<String>, condition: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            condition: FilterCondition::parse(condition),
            values: values.into_iter().map(Into::into).collect(),
            field_type: None,
        }
    }

    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }
}

/// Server-side filter state: nothing, one opaque query string, or a set of
/// structured filters. The two modes are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum FilterState {
    #[default]
    None,
    Query(String),
    Structured(Vec<FilterDescriptor>),
}

impl FilterState {
    /// A blank query is the same as no filter.
    pub fn query(query: impl Into<String>) -> Self {
        let query = query.into();
        if query.trim().is_empty() {
            Self::None
        } else {
            Self::Query(query)
        }
    }

    /// An empty list is the same as no filter.
    pub fn structured(filters: Vec<FilterDescriptor>) -> Self {
        if filters.is_empty() {
            Self::None
        } else {
            Self::Structured(filters)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }
}
