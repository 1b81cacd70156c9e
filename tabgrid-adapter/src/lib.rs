//! Headless grid data adapter.
//!
//! A [`GridAdapter`] turns a page/sort/filter request into a server call,
//! normalizes the `{data, meta, pager}` response and mirrors it as column
//! definitions, rows, pagination and a current selection. It knows nothing
//! about the DOM: the UI layer subscribes to [`GridEvent`]s.
//!
//! # Architecture
//!
//! - [`RequestBuilder`] composes URL and body ([`LegacyRequestBuilder`] for
//!   the `get-data/page-n/` contract)
//! - [`GridTransport`] sends them ([`HttpTransport`] over reqwest, or
//!   [`transport::mock::MockTransport`] in tests)
//! - [`EventEmitter`] fans events out to subscribers
//! - [`SelectionMirror`] keeps the current row across reloads

mod adapter;
mod config;
mod error;
mod events;
mod http;
mod request;
mod selection;
pub mod transport;

pub use adapter::GridAdapter;
pub use config::AdapterConfig;
pub use error::{GridError, GridResult};
pub use events::{EventEmitter, EventHandler, EventKind, GridEvent, SubscriptionId};
pub use http::{HttpTransport, HttpTransportConfig};
pub use request::{
    encode_filter, encode_filter_state, filter_key, parse_page, BuiltRequest,
    LegacyRequestBuilder, LoadOptions, RequestBuilder, RequestParams, RequestShape,
};
pub use selection::{Selection, SelectionMirror};
pub use transport::{GridRequest, GridTransport, Method, TransportResponse};
