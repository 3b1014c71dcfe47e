use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC endpoint returned status {0}")]
    Status(u16),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),

    #[error("ABI decode error: {0}")]
    Abi(String),

    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("Registry traversal cancelled")]
    Cancelled,
}

impl From<hex::FromHexError> for RegistryError {
    fn from(err: hex::FromHexError) -> Self {
        RegistryError::Abi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
