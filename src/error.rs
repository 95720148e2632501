//! Error taxonomy for proxied requests.
//!
//! | Variant | HTTP status | Body |
//! |---------|-------------|------|
//! | `ClientInput`, `UnknownBackend` | 400 | message |
//! | `Upstream` | 400 | upstream `error.message` when extractable |
//! | `InvalidUpstreamPayload` | 400 | generic message |
//! | `UnsupportedSchemaVersion`, `InconsistentVariantSet` | 400 | message |
//! | `Transport`, `UnexpectedPayload` | 500 | generic message, detail logged |

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body sent for every unclassified failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Unexpected internal exception";

#[derive(Error, Debug)]
pub enum ProxyError {
    /// Missing or malformed query parameter
    #[error("{0}")]
    ClientInput(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Upstream answered with a status >= 300
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream body was not JSON; `snippet` holds its first bytes for the log
    #[error("The API returned invalid JSON")]
    InvalidUpstreamPayload { snippet: String },

    #[error("Unsupported GA4GH version: {0}")]
    UnsupportedSchemaVersion(String),

    #[error("callsets must all come from the same variantset")]
    InconsistentVariantSet,

    /// Network failure or timeout talking to a backend
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream JSON lacked a member the translation depends on
    #[error("Unexpected upstream payload: {0}")]
    UnexpectedPayload(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    /// Status code returned to the browser
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_)
            | Self::UnknownBackend(_)
            | Self::Upstream { .. }
            | Self::InvalidUpstreamPayload { .. }
            | Self::UnsupportedSchemaVersion(_)
            | Self::InconsistentVariantSet => StatusCode::BAD_REQUEST,
            Self::Transport(_) | Self::UnexpectedPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for a missing upstream member
    pub fn missing(what: impl std::fmt::Display) -> Self {
        Self::UnexpectedPayload(format!("missing {what}"))
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            // Detail stays server-side
            tracing::error!(error = %self, "Unexpected exception");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            tracing::warn!(error = %self, "Request failed");
            self.to_string()
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_errors_are_bad_request() {
        assert_eq!(
            ProxyError::ClientInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::InconsistentVariantSet.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::InvalidUpstreamPayload {
                snippet: "<html>".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unclassified_errors_are_internal() {
        assert_eq!(
            ProxyError::missing("variantSets").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_message_is_display() {
        let err = ProxyError::Upstream {
            status: 404,
            message: "bad token".into(),
        };
        assert_eq!(err.to_string(), "bad token");
    }
}
