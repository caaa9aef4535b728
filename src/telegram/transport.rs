//! HTTP transport used to reach the Bot API.
//!
//! The client only needs "POST a JSON body, give me status + body back",
//! so that is all [`HttpTransport`] exposes. Tests swap in a fake.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Transport-level fault (connection refused, DNS, body read failure...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Raw HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Something that can POST a JSON body and return the raw response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `body` as JSON to `url`.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by `reqwest`, using the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError(describe_reqwest_error(e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| {
                TransportError(format!("Failed to read response body: {}", e.without_url()))
            })?;

        debug!("Bot API responded with HTTP {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}

/// Formats a `reqwest` error without leaking the request URL, which embeds the bot token.
fn describe_reqwest_error(err: reqwest::Error) -> String {
    format!("HTTP request failed: {}", err.without_url())
}
