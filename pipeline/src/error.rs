use stopmap_metadata::FetchError;
use stopmap_registry::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The registry could not be listed; nothing was ingested
    #[error("Registry error: {0}")]
    Registry(RegistryError),

    #[error("Fetch error: {0}")]
    Fetch(FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Ingestion cancelled")]
    Cancelled,
}

impl From<RegistryError> for PipelineError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Cancelled => PipelineError::Cancelled,
            RegistryError::InvalidConfig(msg) => PipelineError::InvalidConfig(msg),
            other => PipelineError::Registry(other),
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => PipelineError::Cancelled,
            FetchError::InvalidConfig(msg) => PipelineError::InvalidConfig(msg),
            other => PipelineError::Fetch(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
