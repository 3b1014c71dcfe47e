use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stopmap_metadata::{FetchConfig, GatewayConfig, NormalizeConfig};
use stopmap_placement::PlacementConfig;
use stopmap_registry::RegistryConfig;

/// Configuration for a full ingestion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding persisted session state
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Registries to read, in tie-break order
    #[serde(default = "default_registries")]
    pub registries: Vec<RegistryConfig>,

    /// Content-addressed URI rewrite
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Metadata fetching
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Position attribute labels
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Collision placement
    #[serde(default)]
    pub placement: PlacementConfig,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".stopmap")
}

fn default_registries() -> Vec<RegistryConfig> {
    vec![RegistryConfig::default()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            registries: default_registries(),
            gateway: GatewayConfig::default(),
            fetch: FetchConfig::default(),
            normalize: NormalizeConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate().map_err(PipelineError::InvalidConfig)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.registries.is_empty() {
            return Err("At least one registry must be configured".to_string());
        }

        for registry in &self.registries {
            registry.validate()?;
        }

        self.gateway.validate()?;
        self.fetch.validate()?;
        self.normalize.validate()?;
        self.placement.validate()?;

        Ok(())
    }
}
