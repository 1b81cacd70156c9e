//! Transport abstraction.
//!
//! The adapter never talks to the network itself; it hands a
//! [`GridRequest`] to a [`GridTransport`] and receives the raw status and
//! body back. Timeouts and connection handling belong to the transport.

use async_trait::async_trait;

use crate::error::GridResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request ready to send. POST bodies are form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

impl GridRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body.into()),
        }
    }

    /// A POST without a body (row actions such as delete).
    pub fn post_empty(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: None,
        }
    }
}

/// Raw status and body returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A `200 OK` with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes grid requests.
///
/// A transport only fails for transport-level reasons; non-2xx statuses are
/// returned as responses and judged by the caller.
#[async_trait]
pub trait GridTransport: Send + Sync {
    async fn execute(&self, request: GridRequest) -> GridResult<TransportResponse>;
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use crate::error::GridError;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    enum Reply {
        Response(TransportResponse),
        Failure(String),
        Timeout,
    }

    #[derive(Debug, Clone)]
    struct Scripted {
        reply: Reply,
        delay: Option<Duration>,
    }

    /// Replays queued replies in order and records every request.
    ///
    /// An exhausted queue answers with a transport error.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        replies: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<GridRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, reply: Reply, delay: Option<Duration>) {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Scripted { reply, delay });
        }

        /// Queues a `200` with `body` serialized as JSON.
        pub fn push_json(&self, body: serde_json::Value) {
            self.push(Reply::Response(TransportResponse::ok(body.to_string())), None);
        }

        /// Queues a JSON reply that arrives after `delay`.
        pub fn push_delayed(&self, body: serde_json::Value, delay: Duration) {
            self.push(
                Reply::Response(TransportResponse::ok(body.to_string())),
                Some(delay),
            );
        }

        /// Queues a raw status and body.
        pub fn push_response(&self, status: u16, body: impl Into<String>) {
            self.push(Reply::Response(TransportResponse::new(status, body)), None);
        }

        /// Queues a network failure.
        pub fn push_failure(&self, message: impl Into<String>) {
            self.push(Reply::Failure(message.into()), None);
        }

        /// Queues a timeout.
        pub fn push_timeout(&self) {
            self.push(Reply::Timeout, None);
        }

        /// Every request executed so far, in order.
        pub fn requests(&self) -> Vec<GridRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn last_request(&self) -> Option<GridRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }

        pub fn request_count(&self) -> usize {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Replies still queued.
        pub fn pending(&self) -> usize {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }
    }

    #[async_trait]
    impl GridTransport for MockTransport {
        async fn execute(&self, request: GridRequest) -> GridResult<TransportResponse> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            let scripted = self
                .replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            let Some(Scripted { reply, delay }) = scripted else {
                return Err(GridError::Transport("no scripted reply".into()));
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Reply::Response(response) => Ok(response),
                Reply::Failure(message) => Err(GridError::Transport(message)),
                Reply::Timeout => Err(GridError::Timeout),
            }
        }
    }
}
