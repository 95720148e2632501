//! Core data types shared by the backend adapters.
//!
//! - [`SetType`], [`SchemaVersion`], [`Capabilities`], [`Dataset`]: provider metadata
//! - [`ReferenceSegment`]: a named chromosome/contig and its length
//! - [`reference`]: fixed segment tables for named assemblies
//!
//! ## Segment naming
//!
//! Segment names are passed through exactly as each backend reports them.
//! The fallback GRCh38 table uses NCBI-style names (`1`, `X`, `MT`).

pub mod reference;
pub mod segment;
pub mod types;

pub use segment::ReferenceSegment;
pub use types::{Capabilities, Dataset, SchemaVersion, SetType};
