//! Request translators.
//!
//! Each browser operation (set search, set fetch, read search, variant search)
//! is translated into one or more calls against a single backend, in the
//! dialect of that backend's schema version, and the response is reshaped
//! into the stable client-facing JSON.
//!
//! Where a backend lacks a capability (name filtering, partial responses) the
//! translator fetches the full result and emulates it locally, see
//! [`projection`] and [`sets::filter_by_name`].

pub mod params;
pub mod projection;
pub mod reads;
pub mod sets;
pub mod variants;

use serde_json::Value;

use crate::backend::registry::Provider;
use crate::backend::transport::{Transport, UpstreamRequest};
use crate::error::{ProxyError, Result};

/// A provider paired with the transport used to reach it
#[derive(Clone, Copy)]
pub struct Backend<'a> {
    pub provider: &'a Provider,
    transport: &'a dyn Transport,
}

impl<'a> Backend<'a> {
    pub fn new(provider: &'a Provider, transport: &'a dyn Transport) -> Self {
        Self {
            provider,
            transport,
        }
    }

    /// Issue one upstream call and return its JSON body
    ///
    /// # Errors
    ///
    /// Propagates any transport or classification failure unchanged.
    pub async fn fetch(&self, request: UpstreamRequest) -> Result<Value> {
        let method = request.method.clone();
        let path = request.path();
        let response = self.transport.call(self.provider, request).await?;

        #[allow(clippy::cast_possible_truncation)] // Call time won't exceed u64 millis
        let elapsed_ms = response.elapsed.as_millis() as u64;
        tracing::info!(
            backend = %self.provider.key,
            %method,
            %path,
            bytes = response.size,
            elapsed_ms,
            "Upstream call"
        );
        Ok(response.body)
    }
}

impl std::fmt::Debug for Backend<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("provider", &self.provider.key)
            .finish_non_exhaustive()
    }
}

/// `value[key][0]` as a string
pub(crate) fn first_string(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(|v| v.get(0))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProxyError::missing(format!("{key}[0]")))
}

/// `value[key][0].id` as a string
pub(crate) fn first_id(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProxyError::missing(format!("{key}[0].id")))
}
