use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Rewrite rule from a content-addressed URI scheme to an HTTP gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Scheme prefix identifying content-addressed URIs
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Gateway base URL substituted for the scheme
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_scheme() -> String {
    "ipfs://".to_string()
}

fn default_base_url() -> String {
    "https://ipfs.io/ipfs/".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            base_url: default_base_url(),
        }
    }
}

impl GatewayConfig {
    pub fn is_content_addressed(&self, uri: &str) -> bool {
        uri.starts_with(self.scheme.as_str())
    }

    /// Translate a content-addressed URI into a fetchable URL; anything else
    /// passes through unchanged.
    pub fn resolve<'a>(&self, uri: &'a str) -> Cow<'a, str> {
        match uri.strip_prefix(self.scheme.as_str()) {
            Some(path) => Cow::Owned(format!("{}{path}", self.base_url)),
            None => Cow::Borrowed(uri),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.scheme.is_empty() {
            return Err("Gateway scheme must not be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "Gateway base URL must be http(s): {}",
                self.base_url
            ));
        }

        Ok(())
    }
}
