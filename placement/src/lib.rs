//! # Stopmap Placement
//!
//! Detects stops sharing a coordinate and moves them onto distinct, stable
//! positions so that no map marker hides another.
//!
//! Members of a collision group of size `k` are placed on a ring around the
//! shared coordinate at angles `j * 2π / k`, in input order. The ring radius
//! is a real-world distance converted to degrees with a fixed linear scale,
//! which is only accurate near the deployment latitude.
//!
//! ## Example
//!
//! ```
//! use stopmap_metadata::{Position, Stop};
//! use stopmap_placement::Placer;
//!
//! let stop = |name: &str| Stop {
//!     position: Position::new(35.0, 139.0).unwrap(),
//!     name: name.to_string(),
//!     description: String::new(),
//!     image_url: String::new(),
//!     owner: None,
//!     attributes: Vec::new(),
//! };
//!
//! let outcome = Placer::default().place_all(vec![stop("a"), stop("b")]);
//! assert_ne!(outcome.stops[0].position, outcome.stops[1].position);
//! ```

mod config;
mod placer;

pub use config::{
    DEGREES_PER_KM, LINEAR_OFFSET_DEG, PlacementConfig, PlacementStrategy, RADIUS_KM,
};
pub use placer::{PlacementOutcome, PlacementReport, Placer};
