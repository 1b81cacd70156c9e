use serde::{Deserialize, Serialize};
use tabgrid_types::{ColumnMetadata, ColumnType, FieldMeta};

/// Horizontal alignment of a column. `None` on a [`ColumnDef`] means the
/// grid default (left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Center,
    Right,
}

/// Maps the server's `align` hint: `center`/`middle` and `right` are
/// honoured, anything else leaves the default.
pub fn resolve_alignment(align: Option<&str>) -> Option<Align> {
    match align?.trim().to_lowercase().as_str() {
        "center" | "middle" => Some(Align::Center),
        "right" => Some(Align::Right),
        _ => None,
    }
}

/// Display-ready description of one visible column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub field: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub column_type: ColumnType,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
}

impl ColumnDef {
    /// Builds the definition for `field`, or `None` when the field is not
    /// displayed (hidden type or `visible: false`).
    pub fn from_meta(field: &str, meta: &FieldMeta) -> Option<Self> {
        let column_type = meta.column_type();
        if !meta.visible || column_type == ColumnType::Hidden {
            return None;
        }

        let align = resolve_alignment(meta.align.as_deref()).or(match column_type {
            ColumnType::Boolean | ColumnType::File | ColumnType::Image => Some(Align::Center),
            t if t.is_numeric() => Some(Align::Right),
            _ => None,
        });

        Some(Self {
            field: field.to_string(),
            title: meta
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| field.to_string()),
            tooltip: meta.tooltip.clone().filter(|t| !t.is_empty()),
            column_type,
            sortable: meta.sortable,
            align,
            width: meta.width.filter(|w| *w > 0),
            min_width: meta.min_width.filter(|w| *w > 0),
            max_width: meta.max_width.filter(|w| *w > 0),
            css_class: meta.css_class.clone().filter(|c| !c.is_empty()),
        })
    }
}

/// Column definitions in declaration order, skipping undisplayed fields.
pub fn build_columns(metadata: &ColumnMetadata) -> Vec<ColumnDef> {
    metadata
        .iter()
        .filter_map(|(field, meta)| ColumnDef::from_meta(field, meta))
        .collect()
}
