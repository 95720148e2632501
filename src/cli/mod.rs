//! Command-line interface for ga4gh-proxy.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **serve**: Start the browser-facing proxy server
//! - **backends**: Show which backends the registry resolves to
//!
//! ## Usage
//!
//! ```text
//! # Serve the built-in backends on port 8080
//! ga4gh-proxy serve
//!
//! # Enable the Google backend
//! GOOGLE_GENOMICS_TOKEN=$(gcloud auth print-access-token) ga4gh-proxy serve
//!
//! # Check a custom registry file
//! ga4gh-proxy backends --registry backends.json --format json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::annotation::DEFAULT_SNPEDIA_API;

pub mod backends;

#[derive(Parser)]
#[command(name = "ga4gh-proxy")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Serve a genome browser's JSON API from GA4GH backends")]
#[command(
    long_about = "ga4gh-proxy sits between a browser-based genome viewer and one of several GA4GH data providers.\n\nEach browser request names a backend; the proxy translates it into that backend's schema dialect (v0.5.1 or v0.6.0), emulates capabilities the backend lacks, and returns normalized JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(ServeArgs),

    /// List the backends available with the current registry and credentials
    Backends(backends::BackendsArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// JSON registry file replacing the built-in backends
    #[arg(long, env = "GA4GH_PROXY_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Timeout for each upstream call, in seconds
    #[arg(long, default_value = "60")]
    pub upstream_timeout: u64,

    /// Timeout for a whole browser request, in seconds
    #[arg(long, default_value = "180")]
    pub request_timeout: u64,

    /// SNPedia MediaWiki API endpoint
    #[arg(long, default_value = DEFAULT_SNPEDIA_API)]
    pub snpedia_url: reqwest::Url,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
