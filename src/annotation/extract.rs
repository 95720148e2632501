//! Field extraction from wiki markup.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::error::{ProxyError, Result};

fn rs_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\[\[(rs\d+)\]\]").expect("rs link pattern is valid"))
}

/// Value of the first `key=value` line in `content`, matching the key
/// case-insensitively. Empty when the key is absent.
#[must_use]
pub fn content_value(content: &str, key: &str) -> String {
    let Ok(re) = RegexBuilder::new(&format!(r"{}=(.*)\n", regex::escape(key)))
        .case_insensitive(true)
        .build()
    else {
        return String::new();
    };

    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string())
        .unwrap_or_default()
}

/// Distinct `[[rsNNN]]` links on a page, sorted
#[must_use]
pub fn rs_links(content: &str) -> Vec<String> {
    let mut links: Vec<String> = rs_link_regex()
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    links.sort_unstable();
    links.dedup();
    links
}

/// Watson-Crick complement of a single base
///
/// # Errors
///
/// `ClientInput` for anything other than A, C, G or T.
pub fn complement(base: &str) -> Result<&'static str> {
    match base {
        "A" => Ok("T"),
        "T" => Ok("A"),
        "G" => Ok("C"),
        "C" => Ok("G"),
        other => Err(ProxyError::ClientInput(format!(
            "Allele must be one of A, C, G, T, got '{other}'"
        ))),
    }
}
