//! Read search.

use serde_json::{json, Map, Value};

use crate::backend::transport::UpstreamRequest;
use crate::error::Result;
use crate::translate::params::SearchRequest;
use crate::translate::projection::project_records;
use crate::translate::Backend;

/// Page size requested when a field selector is sent upstream
pub const PARTIAL_RESPONSE_PAGE_SIZE: u32 = 1024;

/// Search alignments overlapping a range of one reference.
///
/// Requested fields are selected upstream when the backend supports partial
/// responses, otherwise the full records are trimmed locally.
///
/// # Errors
///
/// Propagates upstream failures.
pub async fn search_reads(backend: &Backend<'_>, search: &SearchRequest) -> Result<Value> {
    let partial = backend.provider.supports_partial_response();

    let mut body = Map::new();
    body.insert("readGroupSetIds".to_string(), json!(search.set_ids));
    body.insert("referenceName".to_string(), json!(search.reference_name));
    body.insert("start".to_string(), json!(search.start));
    body.insert("end".to_string(), json!(search.end));

    let mut selector = None;
    if let (Some(fields), true) = (&search.requested_fields, partial) {
        selector = Some(format!("nextPageToken,alignments({})", fields.join(",")));
        body.insert("pageSize".to_string(), json!(PARTIAL_RESPONSE_PAGE_SIZE));
    }
    if let Some(token) = &search.page_token {
        body.insert("pageToken".to_string(), json!(token));
    }

    let mut request = UpstreamRequest::post("reads/search", Value::Object(body));
    if let Some(selector) = selector {
        request = request.with_query("fields", selector);
    }

    let mut content = backend.fetch(request).await?;

    if let (Some(fields), false) = (&search.requested_fields, partial) {
        project_records(&mut content, "alignments", fields);
    }

    Ok(content)
}
