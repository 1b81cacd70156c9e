//! Filter predicate translation.
//!
//! A [`FilterDescriptor`](tabgrid_types::FilterDescriptor) becomes a
//! [`RowPredicate`] that can be evaluated against loaded rows. Values are
//! normalized per field kind first: numeric and date fields compare as
//! numbers (dates as epoch milliseconds), boolean fields compare as
//! normalized booleans, everything else as lowercase strings.

mod comparable;
mod predicate;

pub use comparable::{compare, Comparable, FieldKind};
pub use predicate::{create_predicate, RowPredicate};
