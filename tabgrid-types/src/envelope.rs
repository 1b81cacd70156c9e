use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{json_kind, ColumnMetadata};
use crate::pager::PagerDescriptor;
use crate::row::Row;
use crate::value::scalar_to_string;
use crate::{Error, Result};

/// Ordered `{id: title}` trail sent alongside some responses.
pub type Breadcrumbs = IndexMap<String, String>;

/// Normalized `{data, meta, pager, breadcrumbs}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ColumnMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<PagerDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Breadcrumbs>,
}

impl ResponseEnvelope {
    /// Normalizes a raw response body.
    ///
    /// A blank body or a literal `null` is an empty envelope.
    pub fn from_body(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Normalizes an already parsed payload.
    ///
    /// `data` may be an array or an object keyed by row index (the
    /// server's encoding of a sparse list); `meta: []` and a non-object
    /// `pager` count as absent.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(Error::MalformedEnvelope(format!(
                    "expected an object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let data = match map.remove("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => rows_from(items)?,
            Some(Value::Object(keyed)) => rows_from(keyed.into_iter().map(|(_, v)| v))?,
            Some(other) => {
                return Err(Error::MalformedEnvelope(format!(
                    "data must be a list, got {}",
                    json_kind(&other)
                )));
            }
        };

        let meta = match map.get("meta") {
            Some(value) => ColumnMetadata::from_value(value)?,
            None => None,
        };
        let pager = map.get("pager").and_then(PagerDescriptor::from_value);
        let breadcrumbs = map.get("breadcrumbs").and_then(breadcrumbs_from);

        Ok(Self {
            data,
            meta,
            pager,
            breadcrumbs,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn rows_from(items: impl IntoIterator<Item = Value>) -> Result<Vec<Row>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(Error::MalformedEnvelope(format!(
                "row {index} must be an object, got {}",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn breadcrumbs_from(value: &Value) -> Option<Breadcrumbs> {
    let map = value.as_object()?;
    Some(
        map.iter()
            .map(|(id, title)| (id.clone(), scalar_to_string(title)))
            .collect(),
    )
}
