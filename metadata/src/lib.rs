//! # Stopmap Metadata
//!
//! Turns registry entries into display-ready [`Stop`] records.
//!
//! ## Features
//!
//! - Content-addressed URI rewriting (`ipfs://` to an HTTP gateway)
//! - Best-effort fetching: missing, unreachable or malformed documents are skipped
//! - Optional bounded concurrency with input order preserved
//! - Tolerant normalization of inconsistent attribute lists
//!
//! ## Example
//!
//! ```no_run
//! use stopmap_metadata::{FetchConfig, GatewayConfig, MetadataFetcher, Normalizer};
//! use stopmap_registry::RegistryEntry;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = MetadataFetcher::new(GatewayConfig::default(), FetchConfig::default())?;
//!     let entries = vec![RegistryEntry {
//!         registry: "0x68Ab0531bF0932ece095797d8E62617e2C234C80".to_string(),
//!         index: 0,
//!         metadata_pointer: "ipfs://QmExample/0.json".to_string(),
//!         owner: None,
//!     }];
//!
//!     let fetched = fetcher.fetch_all(&entries, &CancellationToken::new()).await?;
//!     let normalized = Normalizer::default().normalize_all(&fetched.documents);
//!     println!("{} stops", normalized.stops.len());
//!     Ok(())
//! }
//! ```

mod document;
mod error;
mod fetcher;
mod gateway;
mod normalizer;
mod stop;

pub use document::{FetchedDocument, RawMetadataDocument};
pub use error::{FetchError, NormalizeError, Result};
pub use fetcher::{FetchConfig, FetchOutcome, FetchStats, MetadataFetcher};
pub use gateway::GatewayConfig;
pub use normalizer::{NormalizeConfig, NormalizeOutcome, NormalizeStats, Normalizer};
pub use stop::{Attribute, NonFinitePosition, Position, Stop};
