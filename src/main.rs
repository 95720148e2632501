use clap::Parser;
use tracing_subscriber::EnvFilter;

use ga4gh_proxy::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("ga4gh_proxy=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ga4gh_proxy=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
        cli::Commands::Backends(args) => {
            cli::backends::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
