use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::annotation::WikiSource;
use crate::backend::registry::ClientSettings;
use crate::backend::transport::classify_response;
use crate::error::{ProxyError, Result};

/// Public SNPedia MediaWiki API endpoint
pub const DEFAULT_SNPEDIA_API: &str = "http://bots.snpedia.com/api.php";

/// Reads page revisions through the MediaWiki `query` API
#[derive(Debug, Clone)]
pub struct SnpediaClient {
    http: Client,
    api_url: Url,
}

impl SnpediaClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: Url, settings: &ClientSettings) -> std::result::Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self { http, api_url })
    }
}

#[async_trait]
impl WikiSource for SnpediaClient {
    async fn page_content(&self, title: &str) -> Result<Option<String>> {
        let started = Instant::now();
        let response = self
            .http
            .get(self.api_url.clone())
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("format", "json"),
                ("rvprop", "content"),
                ("titles", title),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%title, error = %e, "SNPedia request failed");
                ProxyError::Transport(e)
            })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let value = classify_response(status, &bytes)?;

        #[allow(clippy::cast_possible_truncation)] // Call time won't exceed u64 millis
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(%title, bytes = bytes.len(), elapsed_ms, "SNPedia page");

        Ok(revision_text(&value))
    }
}

/// Text of the first revision of the (single) page in a query response
fn revision_text(value: &Value) -> Option<String> {
    value
        .get("query")?
        .get("pages")?
        .as_object()?
        .values()
        .next()?
        .get("revisions")?
        .get(0)?
        .get("*")?
        .as_str()
        .map(str::to_string)
}
