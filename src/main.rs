mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

// Re-export from lib for internal use
use jsdoc_paths::{config, error, resolver, syntax};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jsdoc_paths=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let root = cli::load_module_root(&cli.config, cli.module_root.as_deref())?;

    match cli.command {
        Commands::Rewrite { paths, format } => {
            cli::rewrite(root, &paths, &format)?;
        }
        Commands::Exports { module_id, format } => {
            cli::show_exports(root, &module_id, &format)?;
        }
    }

    Ok(())
}
