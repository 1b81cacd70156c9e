//! Request composition against the legacy list contract.
//!
//! ```text
//! POST <base>get-data/[<field>-<asc|desc>/]page-<n>/
//! Content-Type: application/x-www-form-urlencoded
//!
//! languageID=<id>&filter[<field>][]=<v>&filter[condition]=<c>&
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tabgrid_types::{FilterCondition, FilterDescriptor, FilterState, RecordKey, SortState};

use crate::config::AdapterConfig;
use crate::error::{GridError, GridResult};

/// Inputs a request builder turns into a URL and body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub page: u64,
    pub sort: SortState,
    pub filter: FilterState,
}

/// A composed request, before it is handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    pub url: String,
    pub body: String,
}

/// Strategy producing the URL and POST body for a page/sort/filter combination.
pub trait RequestBuilder: Send + Sync {
    /// Returns `None` when no URL can be resolved.
    fn build(&self, params: &RequestParams) -> Option<BuiltRequest>;
}

/// Everything about a request except its page number. Two loads with the
/// same shape differ only in which page they fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestShape {
    pub sort: SortState,
    pub filter: FilterState,
    pub url: Option<String>,
    pub post_body: Option<String>,
}

/// Per-call overrides for `load` and `set_page`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Used instead of the builder's URL.
    pub url: Option<String>,
    /// Used instead of the builder's body.
    pub post_body: Option<String>,
    /// Forces a full replace cycle from `set_page`.
    pub force_reload: bool,
    /// Used instead of the current sort state, without changing it.
    pub sort: Option<SortState>,
    /// Used instead of the current filter state, without changing it.
    pub filter: Option<FilterState>,
}

impl LoadOptions {
    pub fn forced() -> Self {
        Self {
            force_reload: true,
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_post_body(mut self, body: impl Into<String>) -> Self {
        self.post_body = Some(body.into());
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Parses a user-supplied page number. Anything that is not a positive
/// integer is page 1.
pub fn parse_page(input: &str) -> u64 {
    input
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Bracketed form of a field for `filter<key>[]=`.
///
/// `name` becomes `[name]`, `table.name` becomes `[table][name]`, and an
/// already bracketed `[table][name]` is kept.
pub fn filter_key(field: &str) -> String {
    let field = field.trim();
    if field.starts_with('[') {
        return field.to_string();
    }
    field
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| format!("[{part}]"))
        .collect()
}

/// Encodes one structured filter as the legacy body fragment:
/// `filter<key>[]=<v>&...&filter[condition]=<c>&`.
///
/// Blank values are dropped. A condition that needs a value but has none
/// encodes to nothing; valueless conditions (`checked`, `empty`, ...) send
/// one empty value so the server still sees the field.
pub fn encode_filter(field: &str, condition: &FilterCondition, values: &[String]) -> String {
    let key = filter_key(field);
    if key.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<String> = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| format!("filter{key}[]={}", urlencoding::encode(value)))
        .collect();

    if pairs.is_empty() {
        if condition.requires_value() {
            return String::new();
        }
        pairs.push(format!("filter{key}[]="));
    }

    let mut fragment = pairs.join("&");
    fragment.push_str(&format!(
        "&filter[condition]={}&",
        urlencoding::encode(condition.as_wire())
    ));
    fragment
}

/// Encodes a whole filter state.
pub fn encode_filter_state(filter: &FilterState) -> String {
    match filter {
        FilterState::None => String::new(),
        FilterState::Query(query) => query.clone(),
        FilterState::Structured(descriptors) => descriptors
            .iter()
            .map(|d: &FilterDescriptor| encode_filter(&d.field, &d.condition, &d.values))
            .collect(),
    }
}

/// Builder for the legacy `get-data` contract.
///
/// The language can change at runtime (language tabs), so it is held in an
/// atomic; `0` means "no language".
#[derive(Debug)]
pub struct LegacyRequestBuilder {
    base_path: String,
    language_id: AtomicU64,
}

impl LegacyRequestBuilder {
    /// Fails when `base_path` is blank. A trailing slash is added if missing.
    pub fn new(base_path: impl Into<String>) -> GridResult<Self> {
        let base_path = base_path.into();
        let trimmed = base_path.trim();
        if trimmed.is_empty() {
            return Err(GridError::Config("base path must not be empty".into()));
        }
        let base_path = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Ok(Self {
            base_path,
            language_id: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &AdapterConfig) -> GridResult<Self> {
        let builder = Self::new(config.base_path.clone())?;
        builder.set_language_id(config.language_id);
        Ok(builder)
    }

    pub fn with_language(self, language_id: u64) -> Self {
        self.set_language_id(Some(language_id));
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn language_id(&self) -> Option<u64> {
        match self.language_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn set_language_id(&self, language_id: Option<u64>) {
        self.language_id
            .store(language_id.unwrap_or(0), Ordering::Relaxed);
    }

    /// `<base>get-data/[<field>-<order>/]page-<n>/`
    pub fn data_url(&self, page: u64, sort: &SortState) -> String {
        let mut url = format!("{}get-data/", self.base_path);
        if let (Some(field), Some(order)) = (sort.field(), sort.order()) {
            url.push_str(&format!("{}-{}/", urlencoding::encode(field), order));
        }
        url.push_str(&format!("page-{}/", page.max(1)));
        url
    }

    /// `languageID=<id>&` followed by the encoded filter.
    pub fn body(&self, filter: &FilterState) -> String {
        let mut body = String::new();
        if let Some(id) = self.language_id() {
            body.push_str(&format!("languageID={id}&"));
        }
        body.push_str(&encode_filter_state(filter));
        body
    }

    /// `<base><key>/<action>/`
    pub fn record_url(&self, key: &RecordKey, action: &str) -> String {
        let key = urlencoding::encode(key.as_str());
        match action.trim_matches('/') {
            "" => format!("{}{key}/", self.base_path),
            action => format!("{}{key}/{action}/", self.base_path),
        }
    }

    /// `<base><path>/`
    pub fn action_url(&self, path: &str) -> String {
        format!("{}{}/", self.base_path, path.trim_matches('/'))
    }
}

impl RequestBuilder for LegacyRequestBuilder {
    fn build(&self, params: &RequestParams) -> Option<BuiltRequest> {
        Some(BuiltRequest {
            url: self.data_url(params.page, &params.sort),
            body: self.body(&params.filter),
        })
    }
}
