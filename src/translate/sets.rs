//! Set search and set fetch for read group sets and call sets.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::backend::transport::UpstreamRequest;
use crate::core::reference::standard_segments;
use crate::core::segment::ReferenceSegment;
use crate::core::types::{SchemaVersion, SetType};
use crate::error::{ProxyError, Result};
use crate::translate::projection::project_records;
use crate::translate::{first_id, first_string, Backend};

/// Upper bound on call sets returned by a 0.6.0 call set search
pub const CALL_SET_PAGE_SIZE: u32 = 100;

/// Key under which resolved segments are attached to a fetched set
pub const REFERENCES_KEY: &str = "references";

const SUMMARY_FIELDS: [&str; 2] = ["id", "name"];

/// Search a dataset for sets of one type, optionally filtered by name.
///
/// Returns `{}` without any upstream call when the backend does not offer
/// `set_type`.
///
/// # Errors
///
/// Propagates upstream failures; `UnexpectedPayload` if the dataset has no
/// variant set.
pub async fn search_sets(
    backend: &Backend<'_>,
    set_type: SetType,
    dataset_id: &str,
    name: &str,
) -> Result<Value> {
    if !backend.provider.supports_set_type(set_type) {
        tracing::debug!(backend = %backend.provider.key, %set_type, "Set type not offered");
        return Ok(json!({}));
    }

    let array_key = match set_type {
        SetType::ReadSet => "readGroupSets",
        SetType::CallSet => "callSets",
    };

    let mut content = match set_type {
        SetType::ReadSet => search_read_group_sets(backend, dataset_id, name).await?,
        SetType::CallSet => search_call_sets(backend, dataset_id, name).await?,
    };

    if !backend.provider.supports_partial_response() {
        let fields: Vec<String> = SUMMARY_FIELDS.iter().map(|f| (*f).to_string()).collect();
        project_records(&mut content, array_key, &fields);
    }
    if !backend.provider.supports_name_filter() {
        filter_by_name(&mut content, array_key, name);
    }

    Ok(content)
}

async fn search_read_group_sets(backend: &Backend<'_>, dataset_id: &str, name: &str) -> Result<Value> {
    let mut body = Map::new();
    body.insert("datasetIds".to_string(), json!([dataset_id]));
    insert_name_filter(backend, &mut body, name);

    let request = summary_fields(
        backend,
        UpstreamRequest::post("readgroupsets/search", Value::Object(body)),
        "readGroupSets",
    );
    backend.fetch(request).await
}

async fn search_call_sets(backend: &Backend<'_>, dataset_id: &str, name: &str) -> Result<Value> {
    let version = backend.provider.schema_version;

    let lookup = match version {
        SchemaVersion::V0_6_0 => json!({ "datasetId": dataset_id }),
        SchemaVersion::V0_5_1 => json!({ "datasetIds": [dataset_id] }),
    };
    let variant_sets = backend
        .fetch(UpstreamRequest::post("variantsets/search", lookup))
        .await?;
    let variant_set_id = first_id(&variant_sets, "variantSets")?;

    let mut body = Map::new();
    match version {
        SchemaVersion::V0_6_0 => {
            body.insert("variantSetId".to_string(), json!(variant_set_id));
            body.insert("pageSize".to_string(), json!(CALL_SET_PAGE_SIZE));
        }
        SchemaVersion::V0_5_1 => {
            body.insert("variantSetIds".to_string(), json!([variant_set_id]));
        }
    }
    insert_name_filter(backend, &mut body, name);

    let request = summary_fields(
        backend,
        UpstreamRequest::post("callsets/search", Value::Object(body)),
        "callSets",
    );
    backend.fetch(request).await
}

/// Only backends that honour `name` get it; the rest are filtered locally
fn insert_name_filter(backend: &Backend<'_>, body: &mut Map<String, Value>, name: &str) {
    if backend.provider.supports_name_filter() {
        body.insert("name".to_string(), json!(name));
    }
}

fn summary_fields(backend: &Backend<'_>, request: UpstreamRequest, array_key: &str) -> UpstreamRequest {
    if backend.provider.supports_partial_response() {
        request.with_query("fields", format!("{array_key}({})", SUMMARY_FIELDS.join(",")))
    } else {
        request
    }
}

/// Keep the records of `content[array_key]` whose name contains `name`,
/// ignoring case. An empty `name` keeps everything.
pub fn filter_by_name(content: &mut Value, array_key: &str, name: &str) {
    if name.is_empty() {
        return;
    }
    let needle = name.to_lowercase();

    if let Some(records) = content.get_mut(array_key).and_then(Value::as_array_mut) {
        records.retain(|record| {
            record
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        });
    }
}

/// Fetch one set by id and attach its reference segments.
///
/// Returns `{}` without any upstream call when the backend does not offer
/// `set_type`.
///
/// # Errors
///
/// Propagates upstream failures; `UnexpectedPayload` if a call set names no
/// variant set.
pub async fn fetch_set(backend: &Backend<'_>, set_type: SetType, set_id: &str) -> Result<Value> {
    if !backend.provider.supports_set_type(set_type) {
        tracing::debug!(backend = %backend.provider.key, %set_type, "Set type not offered");
        return Ok(json!({}));
    }

    match set_type {
        SetType::ReadSet => fetch_read_group_set(backend, set_id).await,
        SetType::CallSet => fetch_call_set(backend, set_id).await,
    }
}

async fn fetch_read_group_set(backend: &Backend<'_>, set_id: &str) -> Result<Value> {
    let mut set = backend
        .fetch(UpstreamRequest::get("readgroupsets").with_segment(set_id))
        .await?;

    let segments = match reference_set_id(&set) {
        Some(reference_set_id) => reference_set_segments(backend, &reference_set_id).await?,
        None => coverage_segments(backend, set_id).await?,
    };

    attach_segments(&mut set, &segments)?;
    Ok(set)
}

/// The set's own reference set id, else that of its first read group
fn reference_set_id(set: &Value) -> Option<String> {
    let non_empty = |v: &Value| {
        v.get("referenceSetId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    };

    non_empty(set).or_else(|| set.get("readGroups")?.get(0).and_then(non_empty))
}

async fn reference_set_segments(
    backend: &Backend<'_>,
    reference_set_id: &str,
) -> Result<Vec<ReferenceSegment>> {
    let mut request = UpstreamRequest::post(
        "references/search",
        json!({ "referenceSetId": reference_set_id }),
    );
    if backend.provider.supports_partial_response() {
        request = request.with_query("fields", "references(name,length)");
    }

    let references = backend.fetch(request).await?;
    Ok(references
        .get("references")
        .and_then(Value::as_array)
        .map(|refs| {
            refs.iter()
                .filter_map(|r| ReferenceSegment::from_value(r, "name", "length"))
                .collect()
        })
        .unwrap_or_default())
}

/// One segment per distinct coverage bucket range, in first-seen order
async fn coverage_segments(backend: &Backend<'_>, set_id: &str) -> Result<Vec<ReferenceSegment>> {
    let buckets = backend
        .fetch(
            UpstreamRequest::get("readgroupsets")
                .with_segment(set_id)
                .with_segment("coveragebuckets"),
        )
        .await?;

    let mut seen = HashSet::new();
    Ok(buckets
        .get("coverageBuckets")
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|b| ReferenceSegment::from_value(b.get("range")?, "referenceName", "end"))
                .filter(|s| seen.insert(s.clone()))
                .collect()
        })
        .unwrap_or_default())
}

async fn fetch_call_set(backend: &Backend<'_>, set_id: &str) -> Result<Value> {
    let mut call_set = backend
        .fetch(UpstreamRequest::get("callsets").with_segment(set_id))
        .await?;

    let variant_set_id = first_string(&call_set, "variantSetIds")?;
    let variant_set = backend
        .fetch(UpstreamRequest::get("variantsets").with_segment(variant_set_id))
        .await?;

    if let Some(segments) = variant_set_segments(&variant_set) {
        attach_segments(&mut call_set, &segments)?;
    }
    Ok(call_set)
}

/// Segments from the `referenceBounds` extension, else the standard table of
/// the declared reference set, else None.
fn variant_set_segments(variant_set: &Value) -> Option<Vec<ReferenceSegment>> {
    if let Some(bounds) = variant_set.get("referenceBounds").and_then(Value::as_array) {
        return Some(
            bounds
                .iter()
                .filter_map(|b| ReferenceSegment::from_value(b, "referenceName", "upperBound"))
                .collect(),
        );
    }

    variant_set
        .get("referenceSetId")
        .and_then(Value::as_str)
        .and_then(standard_segments)
        .map(<[ReferenceSegment]>::to_vec)
}

fn attach_segments(set: &mut Value, segments: &[ReferenceSegment]) -> Result<()> {
    let object = set
        .as_object_mut()
        .ok_or_else(|| ProxyError::UnexpectedPayload("set is not a JSON object".to_string()))?;
    let segments =
        serde_json::to_value(segments).map_err(|e| ProxyError::UnexpectedPayload(e.to_string()))?;
    object.insert(REFERENCES_KEY.to_string(), segments);
    Ok(())
}
