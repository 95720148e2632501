use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;

use crate::backend::registry::Provider;
use crate::error::{ProxyError, Result};

/// Content type sent with every upstream request
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// How much of a non-JSON upstream body is kept for diagnostics
pub const SNIPPET_LIMIT: usize = 1000;

/// Message used when a failed upstream response carries no `error` member
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Something went wrong with the API call!";

/// One outbound call to a backend's REST API
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// Path segments relative to the provider's URL template, each encoded
    /// on its own when the URL is built
    pub segments: Vec<String>,
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// GET a fixed route such as `callsets/search`
    pub fn get(route: &str) -> Self {
        Self {
            segments: route.split('/').map(str::to_string).collect(),
            method: Method::GET,
            body: None,
            query: Vec::new(),
        }
    }

    /// POST `body` to a fixed route
    pub fn post(route: &str, body: Value) -> Self {
        Self {
            body: Some(body),
            method: Method::POST,
            ..Self::get(route)
        }
    }

    /// Append one path segment. A `/` inside `segment` is encoded, never
    /// treated as a separator.
    #[must_use]
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Segments joined with `/`, for logging and matching
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Value of a query parameter, if set
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A successfully classified upstream response
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub body: Value,
    /// Wall-clock time of the call
    pub elapsed: Duration,
    /// Raw payload size in bytes
    pub size: usize,
}

/// Issues requests against a provider's REST endpoint.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, provider: &Provider, request: UpstreamRequest) -> Result<ParsedResponse>;
}

/// Transport backed by each provider's own `reqwest::Client`
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, provider: &Provider, request: UpstreamRequest) -> Result<ParsedResponse> {
        let url = provider.endpoint(request.segments.as_slice(), &request.query);
        let started = Instant::now();

        let mut builder = provider
            .http()
            .request(request.method.clone(), url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Upstream request failed");
            ProxyError::Transport(e)
        })?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Failed reading upstream body");
            ProxyError::Transport(e)
        })?;

        let body = classify_response(status, &bytes).map_err(|e| {
            match &e {
                ProxyError::InvalidUpstreamPayload { snippet } => {
                    tracing::error!(%url, status, content = %snippet, "Non-JSON API content");
                }
                _ => tracing::error!(%url, status, error = %e, "Upstream call FAILED"),
            }
            e
        })?;

        tracing::debug!(%url, status, "Upstream responded");

        Ok(ParsedResponse {
            body,
            elapsed: started.elapsed(),
            size: bytes.len(),
        })
    }
}

/// Classify a raw upstream response by payload shape and status.
///
/// The body is parsed first, so a non-JSON error page is reported as
/// `InvalidUpstreamPayload` whatever its status.
///
/// # Errors
///
/// `InvalidUpstreamPayload` for non-JSON bodies, `Upstream` for status >= 300.
pub fn classify_response(status: u16, bytes: &[u8]) -> Result<Value> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|_| ProxyError::InvalidUpstreamPayload {
            snippet: snippet(bytes),
        })?;

    if status >= 300 {
        return Err(ProxyError::Upstream {
            status,
            message: upstream_message(&value),
        });
    }

    Ok(value)
}

/// Pull the most specific error text out of an upstream error payload
fn upstream_message(value: &Value) -> String {
    match value.get("error") {
        Some(error) => match error.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(message) => message.to_string(),
            None => match error {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        },
        None => GENERIC_UPSTREAM_MESSAGE.to_string(),
    }
}

fn snippet(bytes: &[u8]) -> String {
    let end = bytes.len().min(SNIPPET_LIMIT);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
