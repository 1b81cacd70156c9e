//! Column definitions and cell formatting for tabgrid.
//!
//! - [`build_columns`] turns server [`ColumnMetadata`](tabgrid_types::ColumnMetadata)
//!   into display-ready [`ColumnDef`]s (visibility, alignment, widths).
//! - [`formatter_for`] maps each [`ColumnType`](tabgrid_types::ColumnType) to a
//!   pure formatting function. The mapping is a closed table: unknown server
//!   type names have already collapsed to `ColumnType::Text` and use the
//!   default formatter.
//! - [`Renderer`] owns the display locale and caches number/date formats keyed
//!   by `(type, precision, scale)` so they are not rebuilt per cell.
//!
//! All formatter output is HTML with every piece of data escaped.

mod columns;
mod config;
mod formatters;
mod html;
mod locale;
mod renderer;

pub use columns::{build_columns, resolve_alignment, Align, ColumnDef};
pub use config::RenderConfig;
pub use formatters::{formatter_for, FormatFn};
pub use html::{escape_html, to_plain_text};
pub use locale::{DateFormat, LocaleSymbols, NumberFormat};
pub use renderer::{NumberFormatKey, Renderer, MAX_FRACTION_DIGITS};
