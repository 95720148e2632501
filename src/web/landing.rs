//! Landing page listing the configured backends and their datasets.

use std::fmt::Write;

use crate::backend::registry::Registry;

const TEMPLATE: &str = include_str!("templates/index.html");
const PLACEHOLDER: &str = "{{backends}}";

/// Escape text for inclusion in HTML content or a quoted attribute
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the landing page for `registry`
#[must_use]
pub fn render_index(registry: &Registry) -> String {
    let mut items = String::new();

    if registry.is_empty() {
        items.push_str("      <li class=\"empty\">No backends configured</li>\n");
    }

    // Writing to a String cannot fail
    for provider in registry.providers() {
        let set_types: Vec<&str> = provider.set_types.iter().map(|t| t.as_str()).collect();
        let _ = writeln!(
            items,
            "      <li class=\"backend\" data-backend=\"{}\" data-set-types=\"{}\">",
            escape_html(&provider.key),
            set_types.join(",")
        );
        let _ = writeln!(
            items,
            "        <strong>{}</strong> <span class=\"version\">GA4GH {}</span>",
            escape_html(&provider.name),
            provider.schema_version
        );
        items.push_str("        <ul class=\"datasets\">\n");
        for dataset in &provider.datasets {
            let _ = writeln!(
                items,
                "          <li data-dataset-id=\"{}\">{}</li>",
                escape_html(&dataset.id),
                escape_html(&dataset.display_name)
            );
        }
        items.push_str("        </ul>\n      </li>\n");
    }

    TEMPLATE.replace(PLACEHOLDER, items.trim_end())
}
