use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use stopmap_metadata::Stop;
use stopmap_pipeline::PipelineConfig;
use stopmap_placement::Placer;
use tracing::info;

#[derive(Debug, Parser)]
pub struct PlaceArgs {
    /// JSON array of stops (defaults to stdin)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Where to write the placed stops (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Spread already-normalized stops without touching the network
pub fn run_place(args: PlaceArgs, config: &PipelineConfig) -> Result<()> {
    let content = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stops from stdin")?;
            buf
        }
    };

    let stops: Vec<Stop> = serde_json::from_str(&content).context("Invalid stop list")?;
    let outcome = Placer::new(config.placement.clone()).place_all(stops);
    info!(
        "Placed {} stops ({} collision groups, {} displaced)",
        outcome.stops.len(),
        outcome.report.collision_groups,
        outcome.report.displaced
    );

    let json = serde_json::to_string_pretty(&outcome.stops)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
