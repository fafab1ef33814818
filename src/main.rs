mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docsweep::config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsweep", version, about = "Find and resolve duplicate documents in Weaviate")]
struct Cli {
    /// Config file (default: ~/.docsweep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read from and delete in a JSON snapshot instead of Weaviate
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report duplicate groups without changing anything
    Detect {
        /// Only consider documents with this exact name
        #[arg(long)]
        name: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan which version of each duplicate to keep (dry run unless --execute)
    Resolve {
        /// Only consider documents with this exact name
        #[arg(long)]
        name: Option<String>,
        /// Delete the losing versions
        #[arg(long)]
        execute: bool,
        /// With --execute, only delete hash-identical copies
        #[arg(long, requires = "execute")]
        exact_only: bool,
        /// Print the plan (and execution report) as JSON
        #[arg(long)]
        json: bool,
        /// Maximum concurrent delete requests
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Dump the candidate documents as a snapshot JSON file to stdout
    Export {
        /// Only export documents with this exact name
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::DocsweepConfig::load_from(path)?,
        None => config::DocsweepConfig::load()?,
    };
    if let Some(path) = &cli.snapshot {
        config.store.backend = "snapshot".into();
        config.store.snapshot_path = path.to_string_lossy().into_owned();
    }

    // Log to stderr so stdout stays clean for --json output.
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Detect { name, json } => {
            cli::detect::detect(&config, name.as_deref(), json).await?;
        }
        Command::Resolve {
            name,
            execute,
            exact_only,
            json,
            concurrency,
        } => {
            let opts = cli::resolve::ResolveOptions {
                name: name.as_deref(),
                execute,
                exact_only,
                json,
                concurrency,
            };
            cli::resolve::resolve(&config, opts).await?;
        }
        Command::Export { name } => {
            cli::export::export(&config, name.as_deref()).await?;
        }
    }

    Ok(())
}
