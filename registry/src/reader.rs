use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::rpc::JsonRpcRegistry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Read-only view of an on-chain token registry
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Registry address, used for provenance and logging
    fn address(&self) -> &str;

    /// Total number of registered items
    async fn total_supply(&self) -> Result<u64>;

    /// Metadata pointer (URI) of item `index`
    async fn token_uri(&self, index: u64) -> Result<String>;

    /// Current owner of item `index`
    async fn owner_of(&self, index: u64) -> Result<String>;
}

/// One registered item with its resolved metadata pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Address of the registry the item belongs to
    pub registry: String,
    pub index: u64,
    pub metadata_pointer: String,
    pub owner: Option<String>,
}

/// A registry together with how it should be traversed
#[derive(Clone)]
pub struct RegistrySource {
    pub registry: Arc<dyn TokenRegistry>,
    pub resolve_owner: bool,
    pub start_index: u64,
}

impl RegistrySource {
    pub fn new(registry: Arc<dyn TokenRegistry>) -> Self {
        Self {
            registry,
            resolve_owner: false,
            start_index: 0,
        }
    }

    pub fn with_owner(mut self) -> Self {
        self.resolve_owner = true;
        self
    }

    pub fn starting_at(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }
}

impl std::fmt::Debug for RegistrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySource")
            .field("registry", &self.registry.address())
            .field("resolve_owner", &self.resolve_owner)
            .field("start_index", &self.start_index)
            .finish()
    }
}

/// Statistics about a registry traversal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    pub registries: usize,
    pub items_registered: u64,
    pub entries_listed: usize,
    pub entries_skipped: usize,
}

/// Entries in traversal order plus traversal statistics
#[derive(Debug, Default)]
pub struct RegistryListing {
    pub entries: Vec<RegistryEntry>,
    pub stats: ReadStats,
}

/// Sequential reader over one or more token registries.
///
/// Entries come back in registry declaration order and, within a registry,
/// in index order. Downstream placement uses this order to break ties, so
/// the traversal never runs concurrently.
#[derive(Debug)]
pub struct RegistryReader {
    sources: Vec<RegistrySource>,
}

impl RegistryReader {
    pub fn new(sources: Vec<RegistrySource>) -> Self {
        Self { sources }
    }

    /// Build a reader with a JSON-RPC registry per configuration entry
    pub fn from_configs(configs: &[RegistryConfig]) -> Result<Self> {
        let sources = configs
            .iter()
            .map(|config| {
                let registry = JsonRpcRegistry::new(config)?;
                Ok(RegistrySource {
                    registry: Arc::new(registry),
                    resolve_owner: config.resolve_owner,
                    start_index: config.start_index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sources))
    }

    pub fn sources(&self) -> &[RegistrySource] {
        &self.sources
    }

    /// List every resolvable entry of every registry.
    ///
    /// All item counts are queried before any item is resolved; a failing
    /// count aborts the whole listing. Per-item failures drop that item only.
    pub async fn list_entries(&self, cancel: &CancellationToken) -> Result<RegistryListing> {
        let mut stats = ReadStats {
            registries: self.sources.len(),
            ..Default::default()
        };

        let mut counts = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let address = source.registry.address();
            let count = guarded(cancel, source.registry.total_supply())
                .await
                .inspect_err(|e| warn!(registry = %address, "Failed to read item count: {e}"))?;
            info!(registry = %address, "Registry holds {count} items");
            stats.items_registered = stats.items_registered.saturating_add(count);
            counts.push(count);
        }

        let mut entries = Vec::new();
        for (source, count) in self.sources.iter().zip(counts) {
            let end = source.start_index.saturating_add(count);
            for index in source.start_index..end {
                match Self::read_entry(source, index, cancel).await {
                    Ok(entry) => entries.push(entry),
                    Err(RegistryError::Cancelled) => return Err(RegistryError::Cancelled),
                    Err(e) => {
                        warn!(
                            registry = %source.registry.address(),
                            index,
                            "Skipping registry item: {e}"
                        );
                        stats.entries_skipped += 1;
                    }
                }
            }
        }

        stats.entries_listed = entries.len();
        info!(
            "Listed {} entries from {} registries ({} skipped)",
            stats.entries_listed, stats.registries, stats.entries_skipped
        );

        Ok(RegistryListing { entries, stats })
    }

    async fn read_entry(
        source: &RegistrySource,
        index: u64,
        cancel: &CancellationToken,
    ) -> Result<RegistryEntry> {
        let registry = &source.registry;
        let metadata_pointer = guarded(cancel, registry.token_uri(index)).await?;
        let owner = if source.resolve_owner {
            Some(guarded(cancel, registry.owner_of(index)).await?)
        } else {
            None
        };

        debug!(registry = %registry.address(), index, "Resolved pointer {metadata_pointer}");

        Ok(RegistryEntry {
            registry: registry.address().to_string(),
            index,
            metadata_pointer,
            owner,
        })
    }
}

async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RegistryError::Cancelled),
        result = call => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory registry recording every call it receives
    #[derive(Default)]
    struct FakeRegistry {
        address: String,
        uris: Vec<String>,
        fail_count: bool,
        fail_uri: HashSet<u64>,
        fail_owner: HashSet<u64>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with_items(address: &str, count: usize) -> Self {
            Self {
                address: address.to_string(),
                uris: (0..count).map(|i| format!("ipfs://{address}/{i}")).collect(),
                ..Default::default()
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl TokenRegistry for FakeRegistry {
        fn address(&self) -> &str {
            &self.address
        }

        async fn total_supply(&self) -> Result<u64> {
            self.record("totalSupply".to_string());
            if self.fail_count {
                return Err(RegistryError::Status(502));
            }
            Ok(self.uris.len() as u64)
        }

        async fn token_uri(&self, index: u64) -> Result<String> {
            self.record(format!("tokenURI({index})"));
            if self.fail_uri.contains(&index) {
                return Err(RegistryError::Rpc {
                    code: 3,
                    message: "execution reverted".to_string(),
                });
            }
            self.uris
                .get(index as usize)
                .cloned()
                .ok_or_else(|| RegistryError::Abi("index out of range".to_string()))
        }

        async fn owner_of(&self, index: u64) -> Result<String> {
            self.record(format!("ownerOf({index})"));
            if self.fail_owner.contains(&index) {
                return Err(RegistryError::Status(500));
            }
            Ok(format!("0xowner{index}"))
        }
    }

    fn indices(listing: &RegistryListing) -> Vec<u64> {
        listing.entries.iter().map(|e| e.index).collect()
    }

    #[tokio::test]
    async fn test_lists_all_entries_in_index_order() {
        let registry = Arc::new(FakeRegistry::with_items("0xa", 5));
        let reader = RegistryReader::new(vec![RegistrySource::new(registry)]);

        let listing = reader.list_entries(&CancellationToken::new()).await.unwrap();

        assert_eq!(indices(&listing), vec![0, 1, 2, 3, 4]);
        assert_eq!(listing.entries[3].metadata_pointer, "ipfs://0xa/3");
        assert_eq!(listing.entries[3].owner, None);
        assert_eq!(listing.stats.entries_listed, 5);
        assert_eq!(listing.stats.items_registered, 5);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = Arc::new(FakeRegistry::with_items("0xa", 0));
        let reader = RegistryReader::new(vec![RegistrySource::new(registry)]);

        let listing = reader.list_entries(&CancellationToken::new()).await.unwrap();

        assert!(listing.entries.is_empty());
        assert_eq!(listing.stats, ReadStats {
            registries: 1,
            ..Default::default()
        });
    }

    #[tokio::test]
    async fn test_item_failures_are_skipped() {
        let mut registry = FakeRegistry::with_items("0xa", 4);
        registry.fail_uri.insert(1);
        registry.fail_owner.insert(2);
        let registry = Arc::new(registry);
        let reader = RegistryReader::new(vec![RegistrySource::new(registry.clone()).with_owner()]);

        let listing = reader.list_entries(&CancellationToken::new()).await.unwrap();

        assert_eq!(indices(&listing), vec![0, 3]);
        assert_eq!(listing.entries[1].owner.as_deref(), Some("0xowner3"));
        assert_eq!(listing.stats.entries_skipped, 2);

        // Failed lookups are never retried
        let calls = registry.calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|c| *c == "tokenURI(1)").count(), 1);
        assert!(!calls.contains(&"ownerOf(1)".to_string()));
    }

    #[tokio::test]
    async fn test_count_failure_aborts_listing() {
        let mut registry = FakeRegistry::with_items("0xa", 3);
        registry.fail_count = true;
        let reader = RegistryReader::new(vec![RegistrySource::new(Arc::new(registry))]);

        let result = reader.list_entries(&CancellationToken::new()).await;

        assert!(matches!(result, Err(RegistryError::Status(502))));
    }

    #[tokio::test]
    async fn test_multiple_registries_concatenate_in_declaration_order() {
        let first = Arc::new(FakeRegistry::with_items("0xa", 2));
        let second = Arc::new(FakeRegistry::with_items("0xb", 3));
        let reader = RegistryReader::new(vec![
            RegistrySource::new(first),
            RegistrySource::new(second),
        ]);

        let listing = reader.list_entries(&CancellationToken::new()).await.unwrap();

        let order: Vec<(String, u64)> = listing
            .entries
            .iter()
            .map(|e| (e.registry.clone(), e.index))
            .collect();
        assert_eq!(order, vec![
            ("0xa".to_string(), 0),
            ("0xa".to_string(), 1),
            ("0xb".to_string(), 0),
            ("0xb".to_string(), 1),
            ("0xb".to_string(), 2),
        ]);
        assert_eq!(listing.stats.registries, 2);
    }

    #[tokio::test]
    async fn test_second_count_failure_prevents_partial_traversal() {
        let first = Arc::new(FakeRegistry::with_items("0xa", 2));
        let mut second = FakeRegistry::with_items("0xb", 2);
        second.fail_count = true;
        let reader = RegistryReader::new(vec![
            RegistrySource::new(first.clone()),
            RegistrySource::new(Arc::new(second)),
        ]);

        assert!(reader.list_entries(&CancellationToken::new()).await.is_err());
        assert_eq!(*first.calls.lock().unwrap(), vec!["totalSupply".to_string()]);
    }

    #[tokio::test]
    async fn test_start_index_offsets_traversal() {
        let mut registry = FakeRegistry::with_items("0xa", 3);
        registry.uris.insert(0, "unused".to_string());
        let reader = RegistryReader::new(vec![
            RegistrySource::new(Arc::new(registry)).starting_at(1),
        ]);

        let listing = reader.list_entries(&CancellationToken::new()).await.unwrap();

        // totalSupply reports 4 here, the fake keeps a placeholder at 0
        assert_eq!(indices(&listing), vec![1, 2, 3]);
        assert_eq!(listing.stats.entries_skipped, 1);
    }

    #[tokio::test]
    async fn test_cancelled_listing() {
        let registry = Arc::new(FakeRegistry::with_items("0xa", 3));
        let reader = RegistryReader::new(vec![RegistrySource::new(registry)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = reader.list_entries(&cancel).await;

        assert!(matches!(result, Err(RegistryError::Cancelled)));
    }
}
