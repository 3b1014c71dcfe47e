use anyhow::Result;
use stopmap_pipeline::PipelineConfig;

/// Print the effective configuration as TOML
pub fn run_config(config: &PipelineConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
