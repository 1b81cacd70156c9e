//! Error types for the adapter layer.

use thiserror::Error;

/// Result type for adapter operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur while loading or manipulating a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Invalid configuration (missing base path, unusable client settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request builder produced no URL and none was supplied.
    #[error("no request URL could be resolved")]
    NoUrl,

    /// Network failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    /// The body was not a usable `{data, meta, pager}` envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The column metadata declares no key field.
    #[error("no key field declared in column metadata")]
    NoKeyField,

    /// The operation needs a selected record.
    #[error("no record selected")]
    NoSelection,
}

impl GridError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<tabgrid_types::Error> for GridError {
    fn from(err: tabgrid_types::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
