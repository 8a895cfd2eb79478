// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for sending queued requests.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests for production ([`HttpTransport`])
//! - Mock transports for unit testing

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rq_core::RequestDescription;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, or similar.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the allotted time.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("server responded {code}: {body}")]
    Status { code: u16, body: String },

    /// The request could not be built (bad URL, header, or method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// True for failures worth retrying later.
    ///
    /// Network errors, timeouts, 5xx, 408 and 429 are transient. Other
    /// statuses and malformed requests fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout(_) => true,
            TransportError::Status { code, .. } => *code >= 500 || *code == 408 || *code == 429,
            TransportError::InvalidRequest(_) => false,
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Future returned by [`Transport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + 'a>>;

/// A successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Response { status, headers: BTreeMap::new(), body: body.into() }
    }
}

/// Transport trait for request/response communication.
///
/// Implementations return `Err(TransportError::Status)` for non-2xx answers
/// so callers can classify failures uniformly.
pub trait Transport: Send + Sync {
    /// Send one request, giving up after `timeout`.
    fn send<'a>(&'a self, request: &'a RequestDescription, timeout: Duration) -> SendFuture<'a>;
}

/// HTTP transport implementation using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    /// Base for resolving relative request URLs.
    base_url: Option<reqwest::Url>,
}

impl HttpTransport {
    /// Create a transport that only accepts absolute URLs.
    pub fn new() -> Self {
        HttpTransport { client: reqwest::Client::new(), base_url: None }
    }

    /// Create a transport resolving relative URLs against `base_url`.
    pub fn with_base_url(base_url: &str) -> TransportResult<Self> {
        let base = reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidRequest(format!("base url '{base_url}': {e}")))?;
        Ok(HttpTransport { client: reqwest::Client::new(), base_url: Some(base) })
    }

    fn resolve(&self, url: &str) -> TransportResult<reqwest::Url> {
        match (reqwest::Url::parse(url), &self.base_url) {
            (Ok(absolute), _) => Ok(absolute),
            (Err(_), Some(base)) => base
                .join(url)
                .map_err(|e| TransportError::InvalidRequest(format!("url '{url}': {e}"))),
            (Err(e), None) => Err(TransportError::InvalidRequest(format!(
                "url '{url}': {e} (set base_url for relative urls)"
            ))),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a RequestDescription, timeout: Duration) -> SendFuture<'a> {
        Box::pin(async move {
            let url = self.resolve(&request.url)?;
            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let mut builder = self.client.request(method, url).timeout(timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(|e| classify(e, timeout))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.text().await.map_err(|e| classify(e, timeout))?;

            if (200..300).contains(&status) {
                Ok(Response { status, headers, body })
            } else {
                Err(TransportError::Status { code: status, body })
            }
        })
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}
