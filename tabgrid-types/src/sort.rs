use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(crate::Error::InvalidSortOrder(other.to_string())),
        }
    }
}

/// Current sort: a field and a direction, or nothing.
///
/// Both parts are set together; a half-set state is never constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    field: Option<String>,
    order: Option<SortOrder>,
}

impl SortState {
    /// No sort.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            order: Some(order),
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn is_active(&self) -> bool {
        self.field.is_some() && self.order.is_some()
    }

    /// Header-click cycle: a new field starts ascending; the current field
    /// goes `asc -> desc -> none`.
    pub fn cycled(&self, field: &str) -> Self {
        if self.field.as_deref() != Some(field) {
            return Self::new(field, SortOrder::Asc);
        }
        match self.order {
            None => Self::new(field, SortOrder::Asc),
            Some(SortOrder::Asc) => Self::new(field, SortOrder::Desc),
            Some(SortOrder::Desc) => Self::none(),
        }
    }
}
