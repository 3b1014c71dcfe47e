use crate::document::{FetchedDocument, RawMetadataDocument};
use crate::error::NormalizeError;
use crate::gateway::GatewayConfig;
use crate::stop::{Attribute, Position, Stop};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Attribute labels carrying a stop's coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Trait label of the latitude (horizontal position) attribute
    #[serde(default = "default_latitude_trait")]
    pub latitude_trait: String,

    /// Trait label of the longitude (vertical position) attribute
    #[serde(default = "default_longitude_trait")]
    pub longitude_trait: String,
}

fn default_latitude_trait() -> String {
    "PositionX_string".to_string()
}

fn default_longitude_trait() -> String {
    "PositionY_string".to_string()
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            latitude_trait: default_latitude_trait(),
            longitude_trait: default_longitude_trait(),
        }
    }
}

impl NormalizeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.latitude_trait.is_empty() || self.longitude_trait.is_empty() {
            return Err("Position trait names must not be empty".to_string());
        }

        if self.latitude_trait == self.longitude_trait {
            return Err(format!(
                "Latitude and longitude traits must differ: {}",
                self.latitude_trait
            ));
        }

        Ok(())
    }
}

/// Statistics about a normalization pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub normalized: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub stops: Vec<Stop>,
    pub stats: NormalizeStats,
}

/// Maps heterogeneous metadata documents onto [`Stop`] records
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
    gateway: GatewayConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig, gateway: GatewayConfig) -> Self {
        Self { config, gateway }
    }

    pub fn normalize(&self, doc: &RawMetadataDocument) -> Result<Stop, NormalizeError> {
        let attributes = collect_attributes(doc.attributes());

        let position = Position {
            latitude: self.coordinate(&attributes, &self.config.latitude_trait)?,
            longitude: self.coordinate(&attributes, &self.config.longitude_trait)?,
        };

        let image = doc.get_str("image").unwrap_or_default();

        Ok(Stop {
            position,
            name: doc.get_str("name").unwrap_or_default().to_string(),
            description: doc.get_str("description").unwrap_or_default().to_string(),
            image_url: self.gateway.resolve(image).into_owned(),
            owner: doc.owner().map(str::to_string),
            attributes,
        })
    }

    /// Normalize every document in order, dropping those without a usable position
    pub fn normalize_all(&self, docs: &[FetchedDocument]) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();

        for fetched in docs {
            match self.normalize(&fetched.document) {
                Ok(stop) => outcome.stops.push(stop),
                Err(e) => {
                    warn!(
                        registry = %fetched.registry,
                        index = fetched.index,
                        "Dropping metadata document: {e}"
                    );
                    outcome.stats.skipped += 1;
                }
            }
        }

        outcome.stats.normalized = outcome.stops.len();
        info!(
            "Normalized {} stops ({} dropped)",
            outcome.stats.normalized, outcome.stats.skipped
        );

        outcome
    }

    fn coordinate(&self, attributes: &[Attribute], trait_type: &str) -> Result<f64, NormalizeError> {
        let attribute = attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .ok_or_else(|| NormalizeError::MissingAttribute(trait_type.to_string()))?;

        attribute
            .value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| NormalizeError::MalformedAttribute {
                trait_type: trait_type.to_string(),
                value: attribute.value.clone(),
            })
    }
}

/// Copy the attribute list, stringifying scalar values. Entries without a
/// trait label or with structured values are dropped.
fn collect_attributes(raw: &[Value]) -> Vec<Attribute> {
    raw.iter()
        .filter_map(|item| {
            let trait_type = item.get("trait_type")?.as_str()?;
            let value = match item.get("value")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    debug!("Ignoring attribute {trait_type} with value {other}");
                    return None;
                }
            };
            Some(Attribute::new(trait_type, value))
        })
        .collect()
}
