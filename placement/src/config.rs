use serde::{Deserialize, Serialize};

/// Approximate degrees per kilometre near the deployment latitude
pub const DEGREES_PER_KM: f64 = 1.0 / 111.0;

/// Ring diameter in kilometres; the ring radius is half of it
pub const RADIUS_KM: f64 = 1.0;

/// Step of the linear strategy in degrees
pub const LINEAR_OFFSET_DEG: f64 = 0.0001;

/// How colliding stops are spread out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Evenly spaced on a ring around the shared coordinate
    #[default]
    Ring,
    /// The n-th duplicate moves n steps north-east
    Linear,
}

/// Configuration for collision placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default)]
    pub strategy: PlacementStrategy,

    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Linear scale from kilometres to degrees
    #[serde(default = "default_degrees_per_km")]
    pub degrees_per_km: f64,

    /// Coordinates closer than this on both axes collide (0 = exact match)
    #[serde(default)]
    pub tolerance_deg: f64,

    #[serde(default = "default_linear_offset_deg")]
    pub linear_offset_deg: f64,
}

fn default_radius_km() -> f64 {
    RADIUS_KM
}

fn default_degrees_per_km() -> f64 {
    DEGREES_PER_KM
}

fn default_linear_offset_deg() -> f64 {
    LINEAR_OFFSET_DEG
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            strategy: PlacementStrategy::Ring,
            radius_km: default_radius_km(),
            degrees_per_km: default_degrees_per_km(),
            tolerance_deg: 0.0,
            linear_offset_deg: default_linear_offset_deg(),
        }
    }
}

impl PlacementConfig {
    /// Ring radius in degrees
    pub fn ring_radius_deg(&self) -> f64 {
        self.degrees_per_km * self.radius_km / 2.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("radius_km", self.radius_km),
            ("degrees_per_km", self.degrees_per_km),
            ("linear_offset_deg", self.linear_offset_deg),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive finite number, got {value}"));
            }
        }

        if !self.tolerance_deg.is_finite() || self.tolerance_deg < 0.0 {
            return Err(format!(
                "tolerance_deg must be a non-negative finite number, got {}",
                self.tolerance_deg
            ));
        }

        let step = match self.strategy {
            PlacementStrategy::Ring => self.ring_radius_deg(),
            PlacementStrategy::Linear => self.linear_offset_deg,
        };
        if self.tolerance_deg >= step {
            return Err(format!(
                "tolerance_deg ({}) must be smaller than the placement step ({step})",
                self.tolerance_deg
            ));
        }

        Ok(())
    }
}
