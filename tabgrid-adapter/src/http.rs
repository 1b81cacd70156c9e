//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::transport::{GridRequest, GridTransport, Method, TransportResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    /// Origin prepended to relative request URLs (e.g. `https://cms.example.com`).
    pub base_url: Option<String>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            user_agent: concat!("tabgrid/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Sends grid requests over HTTP.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> GridResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GridError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Joins a relative URL onto the configured origin. Absolute URLs and
    /// relative URLs without a configured origin are returned unchanged.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match self.config.base_url.as_deref() {
            Some(base) if !base.is_empty() => {
                format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
            }
            _ => url.to_string(),
        }
    }
}

#[async_trait]
impl GridTransport for HttpTransport {
    async fn execute(&self, request: GridRequest) -> GridResult<TransportResponse> {
        let url = self.resolve_url(&request.url);
        debug!(method = ?request.method, url = %url, "sending grid request");

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.unwrap_or_default()),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GridError::Timeout
            } else {
                GridError::Transport(format!("request to {url} failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GridError::Transport(format!("failed to read response body: {e}")))?;

        debug!(status, bytes = body.len(), "grid response received");
        Ok(TransportResponse { status, body })
    }
}
