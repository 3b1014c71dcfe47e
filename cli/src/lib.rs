//! Command-line front end for the stop map ingestion pipeline.

pub mod config_cmd;
pub mod ingest_cmd;
mod logging;
pub mod place_cmd;
pub mod session_cmd;

pub use logging::init_logging;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use stopmap_pipeline::PipelineConfig;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "stopmap.toml";

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, `stopmap.toml` in the working
/// directory is used when present, otherwise built-in defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(PipelineConfig::default());
            }
            fallback
        }
    };

    PipelineConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
