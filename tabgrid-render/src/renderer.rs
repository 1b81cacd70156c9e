use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tabgrid_types::{ColumnMetadata, ColumnType, FieldMeta, Row};

use crate::columns::ColumnDef;
use crate::config::RenderConfig;
use crate::formatters::formatter_for;
use crate::html::escape_html;
use crate::locale::{DateFormat, LocaleSymbols, NumberFormat};

/// Largest `scale` a number format is built for. Larger scales leave the
/// value unformatted.
pub const MAX_FRACTION_DIGITS: u32 = 100;

/// Cache key for number formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberFormatKey {
    pub column_type: ColumnType,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl NumberFormatKey {
    pub fn for_field(meta: &FieldMeta) -> Self {
        Self {
            column_type: meta.column_type(),
            precision: meta.precision,
            scale: meta.scale,
        }
    }

    /// `(min, max)` fraction digits for this key, or `None` when the
    /// scale is above [`MAX_FRACTION_DIGITS`].
    fn fraction_digits(&self) -> Option<(usize, usize)> {
        if self.scale.is_some_and(|s| s > MAX_FRACTION_DIGITS) {
            return None;
        }
        let scale = self.scale.map(|s| s as usize);
        Some(match self.column_type {
            ColumnType::Integer => (0, 0),
            ColumnType::Money => {
                let digits = scale.unwrap_or(2);
                (digits, digits)
            }
            _ => (0, scale.unwrap_or(2).max(2)),
        })
    }
}

/// Renders cells for one display locale.
///
/// Formats are built lazily and cached for the lifetime of the renderer.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    symbols: LocaleSymbols,
    placeholder_html: String,
    number_formats: Mutex<HashMap<NumberFormatKey, Arc<NumberFormat>>>,
    date_formats: Mutex<HashMap<ColumnType, Arc<DateFormat>>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            symbols: LocaleSymbols::for_locale(&config.locale),
            placeholder_html: escape_html(&config.placeholder),
            config,
            number_formats: Mutex::new(HashMap::new()),
            date_formats: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn symbols(&self) -> &LocaleSymbols {
        &self.symbols
    }

    /// The escaped placeholder shown for empty cells.
    pub fn placeholder_html(&self) -> &str {
        &self.placeholder_html
    }

    /// Formats one raw value according to its field's type.
    pub fn render_cell(&self, meta: &FieldMeta, value: Option<&Value>) -> String {
        formatter_for(meta.column_type())(self, meta, value)
    }

    /// Formats the cells of `row` for each column, in column order.
    pub fn render_row(
        &self,
        columns: &[ColumnDef],
        metadata: &ColumnMetadata,
        row: &Row,
    ) -> Vec<String> {
        let fallback = FieldMeta::default();
        columns
            .iter()
            .map(|column| {
                let meta = metadata.get(&column.field).unwrap_or(&fallback);
                self.render_cell(meta, row.get(&column.field))
            })
            .collect()
    }

    /// The cached format for `meta`, or `None` when its scale is out of range.
    pub fn number_format(&self, meta: &FieldMeta) -> Option<Arc<NumberFormat>> {
        let key = NumberFormatKey::for_field(meta);
        let (min, max) = key.fraction_digits()?;
        let mut cache = self
            .number_formats
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let format = cache
            .entry(key)
            .or_insert_with(|| Arc::new(NumberFormat::new(&self.symbols, min, max)));
        Some(Arc::clone(format))
    }

    pub fn date_format(&self, column_type: ColumnType) -> Arc<DateFormat> {
        let mut cache = self
            .date_formats
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(column_type)
            .or_insert_with(|| {
                let symbols = &self.symbols;
                let pattern = match column_type {
                    ColumnType::Time => symbols.time_medium.to_string(),
                    ColumnType::DateTime => format!(
                        "{}{}{}",
                        symbols.date_medium, symbols.date_time_joiner, symbols.time_short
                    ),
                    _ => symbols.date_medium.to_string(),
                };
                Arc::new(DateFormat::new(pattern))
            })
            .clone()
    }

    /// Number of cached `(number, date)` formats.
    pub fn cached_formats(&self) -> (usize, usize) {
        let numbers = self
            .number_formats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let dates = self
            .date_formats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        (numbers, dates)
    }

    /// Absolute URLs and rooted paths are kept; relative paths are joined
    /// onto the media base when one is configured.
    pub fn resolve_media_url(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') || is_absolute_url(path) {
            return path.to_string();
        }
        match self.config.media_base.as_deref() {
            Some(base) if !base.is_empty() => {
                format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
            }
            _ => path.to_string(),
        }
    }
}

fn is_absolute_url(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}
