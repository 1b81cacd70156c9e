//! Core type definitions for tabgrid.
//!
//! This crate defines the server-facing data model shared by every other
//! tabgrid crate:
//! - Column metadata ([`FieldMeta`], [`ColumnMetadata`], [`ColumnType`])
//! - Row records and record keys ([`Row`], [`RecordKey`])
//! - Pager descriptors and the mirrored [`PaginationState`]
//! - Sort and filter state ([`SortState`], [`FilterState`], [`FilterDescriptor`])
//! - The normalized response envelope ([`ResponseEnvelope`])
//!
//! Lenient scalar parsing used by both the renderer and the filter layer
//! lives in [`value`].

mod envelope;
mod field;
mod filter;
mod pager;
mod row;
mod sort;
pub mod value;

pub use envelope::{Breadcrumbs, ResponseEnvelope};
pub use field::{ColumnMetadata, ColumnType, FieldMeta};
pub use filter::{FilterCondition, FilterDescriptor, FilterState};
pub use pager::{PagerDescriptor, PaginationState};
pub use row::{RecordKey, Row};
pub use sort::{SortOrder, SortState};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding grid data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid sort order: {0}")]
    InvalidSortOrder(String),
}
