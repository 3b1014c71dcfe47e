use crate::document::{FetchedDocument, RawMetadataDocument};
use crate::error::{FetchError, Result};
use crate::gateway::GatewayConfig;
use futures::StreamExt;
use futures::stream;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use stopmap_registry::RegistryEntry;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for metadata fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Requests in flight at once; 1 fetches strictly one after another
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Body fragments that mean "no such object" (case-insensitive)
    #[serde(default = "default_not_found_markers")]
    pub not_found_markers: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    1
}

fn default_not_found_markers() -> Vec<String> {
    vec![
        "NoSuchKey".to_string(),
        "no link named".to_string(),
        "not found".to_string(),
    ]
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            not_found_markers: default_not_found_markers(),
        }
    }
}

impl FetchConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("Fetch timeout must be > 0".to_string());
        }

        if self.max_concurrent_fetches == 0 {
            return Err("Max concurrent fetches must be > 0".to_string());
        }

        if self.not_found_markers.iter().any(|m| m.trim().is_empty()) {
            return Err("Not-found markers must not be blank".to_string());
        }

        Ok(())
    }
}

/// Statistics about a fetch batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub requested: usize,
    pub fetched: usize,
    pub skipped: usize,
}

/// Documents that were fetched, in input order
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub documents: Vec<FetchedDocument>,
    pub stats: FetchStats,
}

/// Resolves metadata pointers into parsed metadata documents
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    http: reqwest::Client,
    gateway: GatewayConfig,
    config: FetchConfig,
    markers: Vec<String>,
}

impl MetadataFetcher {
    pub fn new(gateway: GatewayConfig, config: FetchConfig) -> Result<Self> {
        gateway.validate().map_err(FetchError::InvalidConfig)?;
        config.validate().map_err(FetchError::InvalidConfig)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(gateway, config, http))
    }

    pub fn with_client(gateway: GatewayConfig, config: FetchConfig, http: reqwest::Client) -> Self {
        let markers = config
            .not_found_markers
            .iter()
            .map(|m| m.to_lowercase())
            .collect();
        Self {
            http,
            gateway,
            config,
            markers,
        }
    }

    /// Fetch one document by its metadata pointer
    pub async fn fetch_one(&self, pointer: &str) -> Result<RawMetadataDocument> {
        let url = self.gateway.resolve(pointer);
        debug!("Fetching metadata from {url}");

        let resp = self.http.get(&*url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status == StatusCode::NOT_FOUND || self.signals_not_found(&body) {
            return Err(FetchError::NotFound(url.into_owned()));
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.into_owned(),
            });
        }

        Ok(RawMetadataDocument::parse(&body)?)
    }

    /// Fetch every entry, dropping the ones that fail.
    ///
    /// Output order always follows input order, whatever the concurrency.
    /// Only cancellation fails the batch.
    pub async fn fetch_all(
        &self,
        entries: &[RegistryEntry],
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome> {
        self.fetch_all_with_progress(entries, cancel, None).await
    }

    /// Like [`fetch_all`](Self::fetch_all), calling `on_progress(done, total)`
    /// after every entry, fetched or skipped.
    pub async fn fetch_all_with_progress(
        &self,
        entries: &[RegistryEntry],
        cancel: &CancellationToken,
        on_progress: Option<&(dyn Fn(usize, usize) + Sync)>,
    ) -> Result<FetchOutcome> {
        let total = entries.len();
        let mut done = 0;
        let mut outcome = FetchOutcome {
            stats: FetchStats {
                requested: entries.len(),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut results = stream::iter(entries)
            .map(|entry| async move {
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(FetchError::Cancelled),
                    result = self.fetch_one(&entry.metadata_pointer) => result,
                };
                (entry, result)
            })
            .buffered(self.config.max_concurrent_fetches);

        while let Some((entry, result)) = results.next().await {
            match result {
                Ok(mut document) => {
                    if let Some(owner) = &entry.owner {
                        document.merge_owner(owner.as_str());
                    }
                    outcome.documents.push(FetchedDocument {
                        registry: entry.registry.clone(),
                        index: entry.index,
                        document,
                    });
                }
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(e) => {
                    warn!(
                        registry = %entry.registry,
                        index = entry.index,
                        pointer = %entry.metadata_pointer,
                        "Skipping metadata: {e}"
                    );
                    outcome.stats.skipped += 1;
                }
            }

            done += 1;
            if let Some(report) = on_progress {
                report(done, total);
            }
        }

        outcome.stats.fetched = outcome.documents.len();
        info!(
            "Fetched {} of {} metadata documents ({} skipped)",
            outcome.stats.fetched, outcome.stats.requested, outcome.stats.skipped
        );

        Ok(outcome)
    }

    /// Gateways answer missing objects with plain-text or XML bodies
    fn signals_not_found(&self, body: &str) -> bool {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') {
            return false;
        }
        let lower = trimmed.to_lowercase();
        self.markers.iter().any(|marker| lower.contains(marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(index: u64, pointer: String, owner: Option<&str>) -> RegistryEntry {
        RegistryEntry {
            registry: "0xa".to_string(),
            index,
            metadata_pointer: pointer,
            owner: owner.map(str::to_string),
        }
    }

    fn stop_json(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "description": "d",
            "image": "ipfs://img",
            "attributes": [
                {"trait_type": "PositionX_string", "value": "35.0"},
                {"trait_type": "PositionY_string", "value": "139.0"},
            ],
        })
    }

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn fetcher_for(server: &MockServer, config: FetchConfig) -> MetadataFetcher {
        let gateway = GatewayConfig {
            base_url: format!("{}/ipfs/", server.uri()),
            ..Default::default()
        };
        MetadataFetcher::new(gateway, config).unwrap()
    }

    fn names(outcome: &FetchOutcome) -> Vec<String> {
        outcome
            .documents
            .iter()
            .map(|d| d.document.get_str("name").unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_content_addressed_pointer() {
        let server = MockServer::start().await;
        mount_json(&server, "/ipfs/QmA/0.json", stop_json("a")).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let doc = fetcher.fetch_one("ipfs://QmA/0.json").await.unwrap();

        assert_eq!(doc.get_str("name"), Some("a"));
    }

    #[tokio::test]
    async fn test_not_found_body_is_skipped_and_batch_continues() {
        let server = MockServer::start().await;
        mount_json(&server, "/ipfs/a", stop_json("a")).await;
        Mock::given(method("GET"))
            .and(path("/ipfs/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>",
            ))
            .mount(&server)
            .await;
        mount_json(&server, "/ipfs/c", stop_json("c")).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let entries = vec![
            entry(0, "ipfs://a".to_string(), None),
            entry(1, "ipfs://missing".to_string(), None),
            entry(2, "ipfs://c".to_string(), None),
        ];

        let outcome = fetcher
            .fetch_all(&entries, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(names(&outcome), vec!["a", "c"]);
        assert_eq!(outcome.stats, FetchStats {
            requested: 3,
            fetched: 2,
            skipped: 1,
        });
        assert!(matches!(
            fetcher.fetch_one("ipfs://missing").await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_http_404_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ipfs/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ipfs/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, FetchConfig::default());

        assert!(matches!(
            fetcher.fetch_one("ipfs://gone").await,
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            fetcher.fetch_one("ipfs://broken").await,
            Err(FetchError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ipfs/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"name\": "))
            .mount(&server)
            .await;
        mount_json(&server, "/ipfs/good", stop_json("good")).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let entries = vec![
            entry(0, "ipfs://bad".to_string(), None),
            entry(1, "ipfs://good".to_string(), None),
        ];

        let outcome = fetcher
            .fetch_all(&entries, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(names(&outcome), vec!["good"]);
        assert_eq!(outcome.documents[0].index, 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_skipped() {
        let fetcher = MetadataFetcher::new(GatewayConfig::default(), FetchConfig {
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        let entries = vec![entry(0, "http://127.0.0.1:1/nothing".to_string(), None)];

        let outcome = fetcher
            .fetch_all(&entries, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.stats.skipped, 1);
    }

    #[tokio::test]
    async fn test_owner_is_merged() {
        let server = MockServer::start().await;
        let mut body = stop_json("a");
        body["owner"] = json!("0xself-declared");
        mount_json(&server, "/ipfs/a", body).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let entries = vec![entry(4, "ipfs://a".to_string(), Some("0xonchain"))];

        let outcome = fetcher
            .fetch_all(&entries, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.documents[0].document.owner(), Some("0xonchain"));
        assert_eq!(outcome.documents[0].index, 4);
    }

    #[tokio::test]
    async fn test_concurrent_fetch_preserves_input_order() {
        let server = MockServer::start().await;
        for (i, delay_ms) in [(0, 150), (1, 0), (2, 80), (3, 10)] {
            Mock::given(method("GET"))
                .and(path(format!("/ipfs/{i}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(stop_json(&format!("stop-{i}")))
                        .set_delay(Duration::from_millis(delay_ms)),
                )
                .mount(&server)
                .await;
        }

        let fetcher = fetcher_for(&server, FetchConfig {
            max_concurrent_fetches: 4,
            ..Default::default()
        });
        let entries: Vec<RegistryEntry> = (0..4)
            .map(|i| entry(i, format!("ipfs://{i}"), None))
            .collect();

        let outcome = fetcher
            .fetch_all(&entries, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(names(&outcome), vec!["stop-0", "stop-1", "stop-2", "stop-3"]);
    }

    #[tokio::test]
    async fn test_progress_counts_fetched_and_skipped_entries() {
        let server = MockServer::start().await;
        mount_json(&server, "/ipfs/a", stop_json("a")).await;
        mount_json(&server, "/ipfs/c", stop_json("c")).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let entries = vec![
            entry(0, "ipfs://a".to_string(), None),
            entry(1, "ipfs://missing".to_string(), None),
            entry(2, "ipfs://c".to_string(), None),
        ];

        let seen = std::sync::Mutex::new(Vec::new());
        let record = |done: usize, total: usize| seen.lock().unwrap().push((done, total));
        let outcome = fetcher
            .fetch_all_with_progress(&entries, &CancellationToken::new(), Some(&record))
            .await
            .unwrap();

        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(seen.into_inner().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_cancelled_batch() {
        let server = MockServer::start().await;
        mount_json(&server, "/ipfs/a", stop_json("a")).await;

        let fetcher = fetcher_for(&server, FetchConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher
            .fetch_all(&[entry(0, "ipfs://a".to_string(), None)], &cancel)
            .await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_not_found_markers_ignore_json_bodies() {
        let fetcher =
            MetadataFetcher::new(GatewayConfig::default(), FetchConfig::default()).unwrap();
        assert!(fetcher.signals_not_found("404 page not found"));
        assert!(fetcher.signals_not_found("no link named \"1.json\" under QmDir"));
        assert!(!fetcher.signals_not_found(r#"{"description": "Lost and not found office"}"#));
    }

    #[test]
    fn test_config_validation() {
        assert!(FetchConfig::default().validate().is_ok());
        let config = FetchConfig {
            max_concurrent_fetches: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = FetchConfig {
            not_found_markers: vec![" ".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
