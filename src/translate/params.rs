//! Parsing of browser query parameters into a search request.

use serde::Deserialize;

use crate::error::{ProxyError, Result};

/// Raw read/variant search parameters as sent by the browser
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub set_ids: Option<String>,
    pub sequence_name: Option<String>,
    pub sequence_start: Option<String>,
    pub sequence_end: Option<String>,
    pub read_fields: Option<String>,
    pub page_token: Option<String>,
}

/// Validated search over one reference range of one or more sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub set_ids: Vec<String>,
    pub reference_name: String,
    /// Always >= 0
    pub start: i64,
    pub end: i64,
    pub page_token: Option<String>,
    /// Keys the caller wants in each returned record; None means all
    pub requested_fields: Option<Vec<String>>,
}

impl TryFrom<SearchParams> for SearchRequest {
    type Error = ProxyError;

    fn try_from(params: SearchParams) -> Result<Self> {
        Ok(Self {
            set_ids: parse_set_ids(params.set_ids.as_deref())?,
            reference_name: params.sequence_name.unwrap_or_default(),
            start: parse_coordinate("sequenceStart", params.sequence_start.as_deref())?.max(0),
            end: parse_coordinate("sequenceEnd", params.sequence_end.as_deref())?,
            page_token: params.page_token.filter(|t| !t.is_empty()),
            requested_fields: parse_fields(params.read_fields.as_deref()),
        })
    }
}

/// Parse an integer coordinate from query-string text
///
/// # Errors
///
/// `ClientInput` when the value is missing or not an integer.
pub fn parse_coordinate(name: &str, text: Option<&str>) -> Result<i64> {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProxyError::ClientInput(format!("{name} parameter must be set")))?;

    text.parse()
        .map_err(|_| ProxyError::ClientInput(format!("{name} must be an integer, got '{text}'")))
}

/// Split a comma-separated id list, dropping empty items
///
/// # Errors
///
/// `ClientInput` when no ids remain.
pub fn parse_set_ids(text: Option<&str>) -> Result<Vec<String>> {
    let ids: Vec<String> = text
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(ProxyError::ClientInput(
            "setIds parameter must be set".to_string(),
        ));
    }
    Ok(ids)
}

/// Comma-separated field names; None when nothing was requested
#[must_use]
pub fn parse_fields(text: Option<&str>) -> Option<Vec<String>> {
    let fields: Vec<String> = text?
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    (!fields.is_empty()).then_some(fields)
}
