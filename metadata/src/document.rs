use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped metadata document as served by the content store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetadataDocument(Map<String, Value>);

impl RawMetadataDocument {
    /// Field the resolved owner is merged under
    pub const OWNER_FIELD: &'static str = "owner";

    /// Parse a response body; anything but a JSON object is rejected
    pub fn parse(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Raw `attributes` list, empty when absent or not a list
    pub fn attributes(&self) -> &[Value] {
        self.0
            .get("attributes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn owner(&self) -> Option<&str> {
        self.get_str(Self::OWNER_FIELD)
    }

    /// Record the registry-resolved owner, replacing any self-declared one
    pub fn merge_owner(&mut self, owner: impl Into<String>) {
        self.0
            .insert(Self::OWNER_FIELD.to_string(), Value::String(owner.into()));
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// A fetched document with the registry item it describes
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub registry: String,
    pub index: u64,
    pub document: RawMetadataDocument,
}
