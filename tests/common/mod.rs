//! Shared fixtures: providers, a recording mock transport and a fake wiki.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ga4gh_proxy::annotation::WikiSource;
use ga4gh_proxy::backend::registry::{Provider, ProviderConfig};
use ga4gh_proxy::backend::transport::{
    classify_response, ParsedResponse, Transport, UpstreamRequest,
};
use ga4gh_proxy::core::types::{Capabilities, Dataset, SchemaVersion, SetType};
use ga4gh_proxy::error::{ProxyError, Result};
use serde_json::Value;

/// An Ensembl-like backend: 0.6.0, call sets only, no optional capabilities
pub fn ensembl_like() -> Provider {
    provider(
        "ensembl",
        SchemaVersion::V0_6_0,
        Capabilities::default(),
        vec![SetType::CallSet],
    )
}

/// A Google-like backend: 0.5.1, reads and calls, all capabilities
pub fn google_like() -> Provider {
    provider(
        "google",
        SchemaVersion::V0_5_1,
        Capabilities {
            supports_name_filter: true,
            supports_partial_response: true,
        },
        vec![SetType::ReadSet, SetType::CallSet],
    )
}

pub fn provider(
    key: &str,
    schema_version: SchemaVersion,
    capabilities: Capabilities,
    set_types: Vec<SetType>,
) -> Provider {
    let config = ProviderConfig {
        key: key.to_string(),
        name: key.to_uppercase(),
        schema_version,
        url_template: format!("https://{key}.example.org/ga4gh/{{path}}"),
        capabilities,
        set_types,
        datasets: vec![Dataset::new("Test dataset", "ds1")],
        auth: None,
    };
    Provider::new(config, reqwest::Client::new()).expect("valid test provider")
}

/// Transport answering from canned responses keyed by path, recording calls
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, (u16, String)>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with status 200 and `body`
    pub fn respond(self, path: &str, body: Value) -> Self {
        self.respond_raw(path, 200, &body.to_string())
    }

    pub fn respond_raw(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path()).collect()
    }

    /// The recorded call for `path`; panics if there is none
    pub fn call(&self, path: &str) -> UpstreamRequest {
        self.calls()
            .into_iter()
            .find(|c| c.path() == path)
            .unwrap_or_else(|| panic!("no call recorded for {path}"))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, _provider: &Provider, request: UpstreamRequest) -> Result<ParsedResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let (status, body) = self
            .routes
            .get(&request.path())
            .cloned()
            .ok_or_else(|| ProxyError::UnexpectedPayload(format!("no route for {}", request.path())))?;

        Ok(ParsedResponse {
            body: classify_response(status, body.as_bytes())?,
            elapsed: Duration::ZERO,
            size: body.len(),
        })
    }
}

/// Wiki with a fixed set of pages, recording requested titles
#[derive(Default)]
pub struct FakeWiki {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, title: &str, content: &str) -> Self {
        self.pages.insert(title.to_string(), content.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl WikiSource for FakeWiki {
    async fn page_content(&self, title: &str) -> Result<Option<String>> {
        self.requested.lock().unwrap().push(title.to_string());
        Ok(self.pages.get(title).cloned())
    }
}
