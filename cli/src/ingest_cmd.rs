use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use stopmap_metadata::Stop;
use stopmap_pipeline::{
    IngestPhase, IngestProgress, IngestStats, Pipeline, PipelineConfig, PipelineError,
    ProgressCallback, SessionStore,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Where to write the result (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Viewer address for this run, instead of the stored session
    #[arg(long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Print stage progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Result document written by `ingest`
#[derive(Debug, Serialize)]
pub struct IngestOutput<'a> {
    pub viewer: Option<&'a str>,
    pub stops: &'a [Stop],
    pub stats: &'a IngestStats,
}

pub async fn run_ingest(args: IngestArgs, config: &PipelineConfig) -> Result<()> {
    let viewer = args.address.or_else(|| stored_viewer(config));

    let pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling ingestion");
            ctrl_c.cancel();
        }
    });

    let progress: Option<ProgressCallback> = args
        .verbose
        .then(|| Arc::new(print_progress) as ProgressCallback);

    let report = match pipeline.run(&cancel, progress).await {
        Ok(report) => report,
        Err(PipelineError::Cancelled) => anyhow::bail!("Ingestion cancelled"),
        Err(e) => return Err(e).context("Ingestion failed"),
    };

    if report.stats.registry_empty() {
        eprintln!("{} Registry holds no items", "!".bright_yellow());
    }

    let output = IngestOutput {
        viewer: viewer.as_deref(),
        stops: &report.stops,
        stats: &report.stats,
    };
    let json = serde_json::to_string_pretty(&output)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} stops to {}",
                "✓".bright_green(),
                report.stops.len().bright_cyan(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// The stored address, if any. A broken session never blocks ingestion.
fn stored_viewer(config: &PipelineConfig) -> Option<String> {
    match SessionStore::open(&config.state_dir) {
        Ok(store) => store.address().map(str::to_string),
        Err(e) => {
            warn!("Ignoring unreadable session in {}: {e}", config.state_dir.display());
            None
        }
    }
}

fn print_progress(progress: IngestProgress) {
    let label = match progress.phase {
        IngestPhase::Listing => "Listing registries",
        IngestPhase::Fetching => "Fetching metadata",
        IngestPhase::Normalizing => "Normalizing",
        IngestPhase::Placing => "Placing stops",
        IngestPhase::Complete => "Complete",
    };
    if progress.total == 0 {
        eprintln!("{} {label}", "▶".bright_blue());
    } else {
        eprintln!(
            "{} {label} ({}/{})",
            "▶".bright_blue(),
            progress.current,
            progress.total
        );
    }
}
