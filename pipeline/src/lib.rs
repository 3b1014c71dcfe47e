/*!
# Stopmap Pipeline

Ingests token registries into an ordered list of uniquely placed stops.

## Stages

- **List**: read item counts and metadata pointers from every registry
- **Fetch**: resolve pointers into metadata documents, skipping failures
- **Normalize**: extract positions and descriptive fields into [`Stop`]s
- **Place**: spread stops sharing a coordinate onto a ring

Registry order is the tie-break order for placement and is preserved
through every stage.

## Example

```rust,no_run
use stopmap_pipeline::{Pipeline, PipelineConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::default();
    let pipeline = Pipeline::new(&config)?;
    let report = pipeline.run(&CancellationToken::new(), None).await?;

    println!("Placed {} stops, skipped {}",
        report.stops.len(), report.stats.skipped());

    Ok(())
}
```
*/

mod config;
mod error;
mod pipeline;
mod session;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{
    IngestPhase, IngestProgress, IngestReport, IngestStats, Pipeline, ProgressCallback,
};
pub use session::{Session, SessionStore};
pub use stopmap_metadata::Stop;
