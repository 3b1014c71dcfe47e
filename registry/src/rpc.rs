use crate::abi;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::reader::TokenRegistry;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Token registry read over Ethereum JSON-RPC `eth_call`.
#[derive(Debug)]
pub struct JsonRpcRegistry {
    address: String,
    rpc_url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl JsonRpcRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        config.validate().map_err(RegistryError::InvalidConfig)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: &RegistryConfig, http: reqwest::Client) -> Self {
        Self {
            address: config.address.clone(),
            rpc_url: config.rpc_url.clone(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    async fn eth_call(&self, data: String) -> Result<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": self.address, "data": data }, "latest"],
        });

        debug!(registry = %self.address, id, "eth_call {data}");

        let resp = self.http.post(&self.rpc_url).json(&request).send().await?;
        if !resp.status().is_success() {
            return Err(RegistryError::Status(resp.status().as_u16()));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(RegistryError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = body
            .result
            .ok_or_else(|| RegistryError::MalformedResponse("missing result".to_string()))?;
        abi::decode_hex(&result)
    }
}

#[async_trait]
impl TokenRegistry for JsonRpcRegistry {
    fn address(&self) -> &str {
        &self.address
    }

    async fn total_supply(&self) -> Result<u64> {
        let data = self.eth_call(abi::encode_call(abi::TOTAL_SUPPLY, None)).await?;
        abi::decode_uint(&data)
    }

    async fn token_uri(&self, index: u64) -> Result<String> {
        let data = self
            .eth_call(abi::encode_call(abi::TOKEN_URI, Some(index)))
            .await?;
        abi::decode_string(&data)
    }

    async fn owner_of(&self, index: u64) -> Result<String> {
        let data = self
            .eth_call(abi::encode_call(abi::OWNER_OF, Some(index)))
            .await?;
        abi::decode_address(&data)
    }
}
