use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stopmap_cli::config_cmd::run_config;
use stopmap_cli::ingest_cmd::{IngestArgs, run_ingest};
use stopmap_cli::place_cmd::{PlaceArgs, run_place};
use stopmap_cli::session_cmd::SessionCli;
use stopmap_cli::{init_logging, load_config};

/// Build a map of token-registered stops
#[derive(Debug, Parser)]
#[command(name = "stopmap", version)]
struct Cli {
    /// Configuration file (defaults to ./stopmap.toml when present)
    #[arg(short, long, global = true, value_name = "PATH", env = "STOPMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `stopmap_metadata=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read the registries and emit placed stops as JSON
    Ingest(IngestArgs),

    /// Spread colliding stops from a JSON file
    Place(PlaceArgs),

    /// Print the effective configuration
    Config,

    /// Manage the stored viewer address
    Session(SessionCli),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest(args) => run_ingest(args, &config).await,
        Command::Place(args) => run_place(args, &config),
        Command::Config => run_config(&config),
        Command::Session(session) => session.run(&config),
    }
}
