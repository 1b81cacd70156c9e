use serde::{Deserialize, Serialize};

/// Configuration for a [`GridAdapter`](crate::GridAdapter) and the legacy
/// request builder that usually accompanies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Prefix of every list URL, e.g. `/admin/pages/`.
    pub base_path: String,
    /// Content language sent as `languageID`.
    pub language_id: Option<u64>,
    /// Page requested when neither the call nor a previous response names one.
    pub default_page: u64,
    /// Whether rows can be selected at all.
    pub selectable: bool,
    /// Select the first row after a load when nothing else is selected.
    pub auto_select_first: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            language_id: None,
            default_page: 1,
            selectable: true,
            auto_select_first: true,
        }
    }
}
