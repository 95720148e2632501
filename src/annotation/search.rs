//! SNP and allele lookups.

use serde::Serialize;
use serde_json::{json, Value};

use crate::annotation::extract::{complement, content_value, rs_links};
use crate::annotation::{WikiSource, SNPEDIA_PAGE_BASE};
use crate::error::{ProxyError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnpAnnotation {
    pub name: String,
    pub link: String,
    pub position: String,
    pub chr: String,
}

impl SnpAnnotation {
    fn from_page(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            link: page_link(name),
            position: content_value(content, "position"),
            chr: content_value(content, "chromosome"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlleleAnnotation {
    pub name: String,
    pub link: String,
    pub repute: String,
    pub summary: String,
    pub magnitude: String,
}

impl AlleleAnnotation {
    fn from_page(name: &str, content: &str) -> Self {
        let summary = content_value(content, "summary");
        Self {
            name: name.to_string(),
            link: page_link(name),
            repute: content_value(content, "repute"),
            summary: if summary.is_empty() {
                "Unknown".to_string()
            } else {
                summary
            },
            magnitude: content_value(content, "magnitude"),
        }
    }
}

fn page_link(name: &str) -> String {
    format!("{SNPEDIA_PAGE_BASE}{name}")
}

/// Fetch a page, treating an unparseable wiki response like a missing page
async fn page(wiki: &dyn WikiSource, title: &str) -> Result<Option<String>> {
    match wiki.page_content(title).await {
        Err(ProxyError::InvalidUpstreamPayload { snippet }) => {
            tracing::warn!(%title, content = %snippet, "Unreadable SNPedia response");
            Ok(None)
        }
        other => other,
    }
}

/// Look up a SNP by rs id, or every SNP linked from a gene page.
///
/// Returns `{"snps": [...]}`; an unknown page gives an empty list.
///
/// # Errors
///
/// Propagates transport failures talking to the wiki.
pub async fn search_snps(wiki: &dyn WikiSource, snp: &str) -> Result<Value> {
    let mut snps = Vec::new();

    if let Some(content) = page(wiki, snp).await? {
        if snp.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("rs")) {
            snps.push(SnpAnnotation::from_page(snp, &content));
        } else {
            // Gene page: resolve each linked SNP
            for name in rs_links(&content) {
                match page(wiki, &name).await? {
                    Some(linked) => snps.push(SnpAnnotation::from_page(&name, &linked)),
                    None => tracing::debug!(%name, "Linked SNP page missing"),
                }
            }
        }
    }

    Ok(json!({ "snps": snps }))
}

/// Look up the genotype page for an allele pair.
///
/// Tries `snp(a1;a2)`, `snp(a2;a1)`, then the complemented pair in both
/// orders, and returns the first page found, or `{}` when none exists.
///
/// # Errors
///
/// `ClientInput` if either allele is not a base; propagates transport failures.
pub async fn search_alleles(wiki: &dyn WikiSource, snp: &str, a1: &str, a2: &str) -> Result<Value> {
    let a1 = a1.to_ascii_uppercase();
    let a2 = a2.to_ascii_uppercase();
    let a1c = complement(&a1)?;
    let a2c = complement(&a2)?;

    let candidates = [
        (a1.as_str(), a2.as_str()),
        (a2.as_str(), a1.as_str()),
        (a1c, a2c),
        (a2c, a1c),
    ];

    for (first, second) in candidates {
        let title = format!("{snp}({first};{second})");
        if let Some(content) = page(wiki, &title).await? {
            let annotation = AlleleAnnotation::from_page(&title, &content);
            return serde_json::to_value(annotation)
                .map_err(|e| ProxyError::UnexpectedPayload(e.to_string()));
        }
    }

    Ok(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele_summary_defaults_to_unknown() {
        let a = AlleleAnnotation::from_page("Rs1(A;G)", "|repute=Bad\n|magnitude=3\n");
        assert_eq!(a.summary, "Unknown");
        assert_eq!(a.repute, "Bad");
        assert_eq!(a.magnitude, "3");
        assert_eq!(a.link, "http://www.snpedia.com/index.php/Rs1(A;G)");
    }

    #[test]
    fn test_snp_from_page() {
        let s = SnpAnnotation::from_page("rs53576", "|Chromosome=3\n|position=8762685\n");
        assert_eq!(s.chr, "3");
        assert_eq!(s.position, "8762685");
    }
}
