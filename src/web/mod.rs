//! Web server exposing the browser-facing JSON API.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! ga4gh-proxy serve
//!
//! # Custom port and auto-open browser
//! ga4gh-proxy serve --port 3000 --open
//!
//! # Backends from a registry file
//! ga4gh-proxy serve --registry backends.json
//! ```
//!
//! ## API Endpoints
//!
//! All `/api/*` routes are GET. Every GA4GH route needs a `backend` selector.
//!
//! - `GET /` - Landing page listing backends and datasets
//! - `GET /api/backends` - Configured backends and their capabilities
//! - `GET /api/sets` - Fetch a set (`setType`, `setId`) or search (`setType`, `datasetId`, `name`)
//! - `GET /api/reads` - Read search (`setIds`, `sequenceName`, `sequenceStart`, `sequenceEnd`, `readFields`, `pageToken`)
//! - `GET /api/variants` - Variant search (`setIds`, `sequenceName`, `sequenceStart`, `sequenceEnd`, `pageToken`)
//! - `GET /api/snps` - SNPedia SNP lookup (`snp`)
//! - `GET /api/alleles` - SNPedia genotype lookup (`snp`, `a1`, `a2`)
//!
//! Failures are plain text: 400 with a message for classified errors, 500 with
//! a generic message otherwise.

pub mod landing;
pub mod server;
