//! SNP and allele annotations from SNPedia.
//!
//! SNPedia is a MediaWiki; annotation fields live in page templates as
//! `key=value` lines and are extracted with regular expressions. This path is
//! independent of the GA4GH backends.

pub mod client;
pub mod extract;
pub mod search;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{SnpediaClient, DEFAULT_SNPEDIA_API};
pub use search::{search_alleles, search_snps, AlleleAnnotation, SnpAnnotation};

/// Base of the human-facing page links returned to the browser
pub const SNPEDIA_PAGE_BASE: &str = "http://www.snpedia.com/index.php/";

/// Source of raw wiki page text
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Latest revision text of `title`, or None if the page does not exist
    async fn page_content(&self, title: &str) -> Result<Option<String>>;
}
