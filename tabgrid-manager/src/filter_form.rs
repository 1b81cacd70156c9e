use serde::{Deserialize, Serialize};
use tabgrid_adapter::encode_filter;
use tabgrid_types::{FilterCondition, FilterDescriptor};

/// The list's filter panel: one field, one condition, and up to two inputs
/// (two for `between`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterForm {
    /// Field as offered by the panel; may be dotted (`table.field`).
    pub field: String,
    pub condition: FilterCondition,
    #[serde(default)]
    pub values: Vec<String>,
    /// Raw server type of `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl FilterForm {
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

    /// Whether applying the form filters anything. A form whose inputs are
    /// all blank is treated as a reset.
    pub fn is_active(&self) -> bool {
        !self.encode().is_empty()
    }

    /// Legacy body fragment: `filter<field>[]=<v>&...&filter[condition]=<c>&`.
    pub fn encode(&self) -> String {
        encode_filter(&self.field, &self.condition, &self.values)
    }

    /// Values stay positional (a blank `between` lower bound remains in
    /// slot 0); blanks are skipped only when encoding.
    pub fn to_descriptor(&self) -> FilterDescriptor {
        FilterDescriptor {
            field: self.field.clone(),
            condition: self.condition.clone(),
            values: self.values.iter().map(|v| v.trim().to_string()).collect(),
            field_type: self.field_type.clone(),
        }
    }
}
