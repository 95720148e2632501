use std::path::PathBuf;

use clap::Args;

use crate::backend::registry::{ClientSettings, Provider, Registry};
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct BackendsArgs {
    /// JSON registry file replacing the built-in backends
    #[arg(long, env = "GA4GH_PROXY_REGISTRY")]
    pub registry: Option<PathBuf>,
}

/// Print the backends the registry resolves to
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded.
pub fn run(args: BackendsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let registry = Registry::load(args.registry.as_deref(), &ClientSettings::default())?;

    if verbose {
        eprintln!("Loaded registry with {} backends", registry.len());
    }

    match format {
        OutputFormat::Text => print_text(&registry),
        OutputFormat::Json => {
            let backends: Vec<serde_json::Value> =
                registry.providers().iter().map(backend_json).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "count": backends.len(),
                    "backends": backends,
                }))?
            );
        }
        OutputFormat::Tsv => {
            println!("key\tname\tschema_version\tset_types\tname_filter\tpartial_response\tdatasets");
            for p in registry.providers() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    p.key,
                    p.name,
                    p.schema_version,
                    set_types(p),
                    p.supports_name_filter(),
                    p.supports_partial_response(),
                    p.datasets.len()
                );
            }
        }
    }

    Ok(())
}

fn set_types(provider: &Provider) -> String {
    provider
        .set_types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn backend_json(p: &Provider) -> serde_json::Value {
    serde_json::json!({
        "key": p.key,
        "name": p.name,
        "schema_version": p.schema_version,
        "url_template": p.url_template(),
        "supports_name_filter": p.supports_name_filter(),
        "supports_partial_response": p.supports_partial_response(),
        "set_types": p.set_types,
        "datasets": p.datasets,
    })
}

fn print_text(registry: &Registry) {
    let key_width = registry
        .providers()
        .iter()
        .map(|p| p.key.len())
        .max()
        .unwrap_or(3)
        .max(3);
    let name_width = registry
        .providers()
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("Backends ({} available)\n", registry.len());
    println!(
        "{:<key_w$} {:<name_w$} {:<7} {:<16} {:>8}",
        "Key",
        "Name",
        "Schema",
        "Set types",
        "Datasets",
        key_w = key_width,
        name_w = name_width,
    );
    println!("{}", "-".repeat(key_width + name_width + 7 + 16 + 8 + 4));

    for p in registry.providers() {
        println!(
            "{:<key_w$} {:<name_w$} {:<7} {:<16} {:>8}",
            p.key,
            p.name,
            p.schema_version.as_str(),
            set_types(p),
            p.datasets.len(),
            key_w = key_width,
            name_w = name_width,
        );
        for d in &p.datasets {
            println!("    {} ({})", d.display_name, d.id);
        }
    }
}
