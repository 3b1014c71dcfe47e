use thiserror::Error;

/// Errors raised while fetching a metadata document
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status that does not look like a missing object
    #[error("Gateway returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The store reported that the object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Body is not a JSON object
    #[error("Malformed metadata document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid fetch configuration: {0}")]
    InvalidConfig(String),

    #[error("Metadata fetch cancelled")]
    Cancelled,
}

/// Errors raised while normalizing a metadata document into a stop
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// A required position attribute is absent
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// A position attribute is present but not a finite number
    #[error("Malformed attribute {trait_type}: {value:?}")]
    MalformedAttribute { trait_type: String, value: String },
}

pub type Result<T> = std::result::Result<T, FetchError>;
