//! # ga4gh-proxy
//!
//! A server-side proxy between a browser-based genome viewer and GA4GH
//! genomics backends.
//!
//! The browser speaks one small JSON API. Each backend speaks its own dialect
//! of the GA4GH schema (v0.5.1 or v0.6.0), with its own field names and
//! optional features. `ga4gh-proxy` translates every browser request into the
//! calls the selected backend understands and normalizes the answer.
//!
//! ## Features
//!
//! - **Dialect translation**: singular vs. plural id keys, variant set
//!   resolution for backends that require it
//! - **Capability emulation**: client-side name filtering and field projection
//!   for backends without them
//! - **Reference segments**: from reference sets, coverage buckets, variant set
//!   bounds, or a built-in GRCh38 table
//! - **Annotations**: SNP and genotype summaries scraped from SNPedia
//!
//! ## Example
//!
//! ```rust,no_run
//! use ga4gh_proxy::backend::{ClientSettings, HttpTransport, Registry};
//! use ga4gh_proxy::core::SetType;
//! use ga4gh_proxy::translate::{sets::search_sets, Backend};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::load(None, &ClientSettings::default())?;
//! let provider = registry.lookup(Some("Ensembl"))?;
//! let backend = Backend::new(provider, &HttpTransport);
//!
//! let call_sets = search_sets(&backend, SetType::CallSet, "6e340c4d1e333c7a676b1710d2e3953c", "HG00").await?;
//! println!("{call_sets}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`backend`]: Backend registry and HTTP transport
//! - [`translate`]: Per-operation request/response translators
//! - [`core`]: Domain types and the fixed reference tables
//! - [`annotation`]: SNPedia lookups
//! - [`web`]: Axum server exposing the browser API
//! - [`cli`]: Command-line interface implementation

pub mod annotation;
pub mod backend;
pub mod cli;
pub mod core;
pub mod error;
pub mod translate;
pub mod web;

// Re-export commonly used types for convenience
pub use backend::registry::{Provider, Registry};
pub use backend::transport::{HttpTransport, Transport};
pub use core::types::*;
pub use error::ProxyError;
pub use translate::Backend;
