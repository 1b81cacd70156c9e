use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::count_from_value;

/// Server pager block: `{count, current, records}`.
///
/// Each part is optional; fields that are missing or not numeric are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerDescriptor {
    /// Total number of pages.
    pub count: Option<u64>,
    /// Current page (1-based).
    pub current: Option<u64>,
    /// Total number of records.
    pub records: Option<u64>,
}

impl PagerDescriptor {
    /// Decodes a pager block. Anything other than an object means "no pager".
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let field = |name: &str| map.get(name).and_then(count_from_value);
        Some(Self {
            count: field("count"),
            current: field("current"),
            records: field("records"),
        })
    }
}

/// Client-side mirror of the last server pager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: u64,
    pub total_pages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

impl PaginationState {
    /// Folds a pager block into the previous state. Parts the server did not
    /// send as numbers keep their previous value.
    pub fn merged(previous: Option<&Self>, pager: &PagerDescriptor) -> Self {
        let mut next = previous.copied().unwrap_or_default();
        if let Some(count) = pager.count {
            next.total_pages = count;
        }
        if let Some(current) = pager.current {
            next.current_page = current;
        }
        if let Some(records) = pager.records {
            next.total_records = Some(records);
        }
        next
    }

    pub fn with_page_size(mut self, page_size: Option<u64>) -> Self {
        if page_size.is_some() {
            self.page_size = page_size;
        }
        self
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}
