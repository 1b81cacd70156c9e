//! List manager for tabgrid.
//!
//! A [`GridManager`] drives one [`GridAdapter`](tabgrid_adapter::GridAdapter)
//! the way an admin list screen does: paging, the language tabs, the filter
//! panel, and row actions (delete, reorder, move) against the legacy
//! `<base><id>/<action>/` endpoints. The adapter and builder are passed in;
//! nothing is looked up globally.

mod filter_form;
mod manager;

pub use filter_form::FilterForm;
pub use manager::{GridManager, MoveDirection};
