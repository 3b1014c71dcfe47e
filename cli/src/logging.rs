use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr so stdout stays
/// reserved for command output.
///
/// An explicit level wins over `RUST_LOG`; `info` applies when neither is set.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
