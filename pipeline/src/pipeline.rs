use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use serde::Serialize;
use std::sync::Arc;
use stopmap_metadata::{FetchStats, MetadataFetcher, NormalizeStats, Normalizer, Stop};
use stopmap_placement::{PlacementReport, Placer};
use stopmap_registry::{ReadStats, RegistryReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Progress callback for ingestion runs
pub type ProgressCallback = Arc<dyn Fn(IngestProgress) + Send + Sync>;

/// Ingestion progress information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestProgress {
    pub phase: IngestPhase,
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Listing,
    Fetching,
    Normalizing,
    Placing,
    Complete,
}

/// Per-stage statistics of one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub registry: ReadStats,
    pub fetch: FetchStats,
    pub normalize: NormalizeStats,
    pub placement: PlacementReport,
}

impl IngestStats {
    /// Entries dropped at any stage
    pub fn skipped(&self) -> usize {
        self.registry.entries_skipped + self.fetch.skipped + self.normalize.skipped
    }

    /// True when the registries hold no items at all, as opposed to every
    /// item having been dropped along the way
    pub fn registry_empty(&self) -> bool {
        self.registry.items_registered == 0
    }
}

/// Result of a successful run: placed stops in registry order
#[derive(Debug, Default)]
pub struct IngestReport {
    pub stops: Vec<Stop>,
    pub stats: IngestStats,
}

/// Registry → fetch → normalize → place
#[derive(Debug)]
pub struct Pipeline {
    reader: RegistryReader,
    fetcher: MetadataFetcher,
    normalizer: Normalizer,
    placer: Placer,
}

impl Pipeline {
    /// Build every stage from configuration
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate().map_err(PipelineError::InvalidConfig)?;

        let reader = RegistryReader::from_configs(&config.registries)?;
        let fetcher = MetadataFetcher::new(config.gateway.clone(), config.fetch.clone())?;
        let normalizer = Normalizer::new(config.normalize.clone(), config.gateway.clone());
        let placer = Placer::new(config.placement.clone());

        Ok(Self::from_parts(reader, fetcher, normalizer, placer))
    }

    pub fn from_parts(
        reader: RegistryReader,
        fetcher: MetadataFetcher,
        normalizer: Normalizer,
        placer: Placer,
    ) -> Self {
        Self {
            reader,
            fetcher,
            normalizer,
            placer,
        }
    }

    /// Run a full ingestion.
    ///
    /// Fails only when a registry count cannot be read or the run is
    /// cancelled; every per-entry failure is counted in the stats instead.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<IngestReport> {
        info!(
            "Starting ingestion from {} registries",
            self.reader.sources().len()
        );
        let mut stats = IngestStats::default();

        report_progress(&progress_callback, IngestPhase::Listing, 0, 0);
        let listing = self.reader.list_entries(cancel).await?;
        stats.registry = listing.stats;

        let total = listing.entries.len();
        report_progress(&progress_callback, IngestPhase::Fetching, 0, total);
        let on_fetch = |done: usize, total: usize| {
            report_progress(&progress_callback, IngestPhase::Fetching, done, total);
        };
        let fetched = self
            .fetcher
            .fetch_all_with_progress(&listing.entries, cancel, Some(&on_fetch))
            .await?;
        stats.fetch = fetched.stats;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        report_progress(
            &progress_callback,
            IngestPhase::Normalizing,
            fetched.documents.len(),
            total,
        );
        let normalized = self.normalizer.normalize_all(&fetched.documents);
        stats.normalize = normalized.stats;

        report_progress(
            &progress_callback,
            IngestPhase::Placing,
            normalized.stops.len(),
            total,
        );
        let placed = self.placer.place_all(normalized.stops);
        stats.placement = placed.report;

        report_progress(
            &progress_callback,
            IngestPhase::Complete,
            placed.stops.len(),
            total,
        );

        info!(
            "Ingestion complete: {} stops from {} registered items ({} skipped)",
            placed.stops.len(),
            stats.registry.items_registered,
            stats.skipped()
        );

        Ok(IngestReport {
            stops: placed.stops,
            stats,
        })
    }
}

fn report_progress(
    callback: &Option<ProgressCallback>,
    phase: IngestPhase,
    current: usize,
    total: usize,
) {
    if let Some(cb) = callback {
        cb(IngestProgress {
            phase,
            current,
            total,
        });
    }
}
