//! Variant search.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::backend::transport::UpstreamRequest;
use crate::core::types::SchemaVersion;
use crate::error::{ProxyError, Result};
use crate::translate::params::SearchRequest;
use crate::translate::{first_string, Backend};

/// Page size for every variant search
pub const VARIANT_PAGE_SIZE: u32 = 100;

/// Search variants of the given call sets over a range of one reference.
///
/// Under 0.6.0 the body must also name the variant set. The browser only
/// knows call set ids, so it is resolved from the call sets themselves.
///
/// # Errors
///
/// `InconsistentVariantSet` if the call sets do not share exactly one variant
/// set; otherwise propagates upstream failures.
pub async fn search_variants(backend: &Backend<'_>, search: &SearchRequest) -> Result<Value> {
    let mut body = Map::new();
    body.insert("callSetIds".to_string(), json!(search.set_ids));
    body.insert("referenceName".to_string(), json!(search.reference_name));
    body.insert("start".to_string(), json!(search.start));
    body.insert("end".to_string(), json!(search.end));
    body.insert("pageSize".to_string(), json!(VARIANT_PAGE_SIZE));

    match backend.provider.schema_version {
        SchemaVersion::V0_6_0 => {
            let variant_set_id = resolve_variant_set(backend, &search.set_ids).await?;
            body.insert("variantSetId".to_string(), json!(variant_set_id));
        }
        SchemaVersion::V0_5_1 => {}
    }

    if let Some(token) = &search.page_token {
        body.insert("pageToken".to_string(), json!(token));
    }

    backend
        .fetch(UpstreamRequest::post("variants/search", Value::Object(body)))
        .await
}

/// The single variant set shared by all `call_set_ids`
///
/// # Errors
///
/// `InconsistentVariantSet` when the call sets declare more than one.
pub async fn resolve_variant_set(backend: &Backend<'_>, call_set_ids: &[String]) -> Result<String> {
    let mut variant_set_ids = BTreeSet::new();
    for call_set_id in call_set_ids {
        let call_set = backend
            .fetch(UpstreamRequest::get("callsets").with_segment(call_set_id))
            .await?;
        variant_set_ids.insert(first_string(&call_set, "variantSetIds")?);
    }

    let mut ids = variant_set_ids.into_iter();
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id),
        _ => Err(ProxyError::InconsistentVariantSet),
    }
}
