use serde::{Deserialize, Serialize};

/// Stop registry deployed on Polygon.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0x68Ab0531bF0932ece095797d8E62617e2C234C80";

/// Public Polygon RPC endpoint the registry is read through.
pub const DEFAULT_RPC_URL: &str = "https://rpc-mainnet.maticvigil.com";

/// Configuration for one on-chain token registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Contract address (`0x` hex)
    pub address: String,

    /// JSON-RPC endpoint used for `eth_call`
    pub rpc_url: String,

    /// Resolve `ownerOf` for every token
    #[serde(default)]
    pub resolve_owner: bool,

    /// First token index; registries minting from 1 set this to 1
    #[serde(default)]
    pub start_index: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_REGISTRY_ADDRESS.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            resolve_owner: false,
            start_index: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RegistryConfig {
    pub fn new(address: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let hex_part = self
            .address
            .strip_prefix("0x")
            .or_else(|| self.address.strip_prefix("0X"))
            .ok_or_else(|| format!("Registry address must start with 0x: {}", self.address))?;

        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Registry address must be 20 hex-encoded bytes: {}",
                self.address
            ));
        }

        if self.rpc_url.trim().is_empty() {
            return Err(format!("RPC URL is empty for registry {}", self.address));
        }

        if self.timeout_secs == 0 {
            return Err("Registry timeout must be > 0".to_string());
        }

        Ok(())
    }
}
