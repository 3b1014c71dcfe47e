use crate::config::{PlacementConfig, PlacementStrategy};
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::{PI, SQRT_2, TAU};
use stopmap_metadata::{Position, Stop};
use tracing::{debug, info};

/// Summary of a placement pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    /// Groups with more than one member
    pub collision_groups: usize,
    /// Stops whose position was replaced
    pub displaced: usize,
    /// Size of the biggest collision group, 0 when nothing collided
    pub largest_group: usize,
}

#[derive(Debug, Default)]
pub struct PlacementOutcome {
    pub stops: Vec<Stop>,
    pub report: PlacementReport,
}

/// Spreads stops sharing a coordinate onto distinct positions.
///
/// Placement is a pure function of the input sequence: group membership and
/// order inside a group follow input order, so the same input always yields
/// the same output.
#[derive(Debug, Clone, Default)]
pub struct Placer {
    config: PlacementConfig,
}

impl Placer {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn place_all(&self, mut stops: Vec<Stop>) -> PlacementOutcome {
        let groups = self.collision_groups(&stops);
        let mut report = PlacementReport::default();

        for group in groups.iter().filter(|g| g.len() > 1) {
            report.collision_groups += 1;
            report.largest_group = report.largest_group.max(group.len());

            let anchor = stops[group[0]].position;
            debug!(
                "Spreading {} stops at ({}, {})",
                group.len(),
                anchor.latitude,
                anchor.longitude
            );

            for (slot, &member) in group.iter().enumerate() {
                let placed = self.offset(anchor, slot, group.len());
                if placed != stops[member].position {
                    stops[member].position = placed;
                    report.displaced += 1;
                }
            }
        }

        info!(
            "Placed {} stops: {} collision groups, {} displaced",
            stops.len(),
            report.collision_groups,
            report.displaced
        );

        PlacementOutcome { stops, report }
    }

    /// Partition stop indices by original coordinate, in input order.
    ///
    /// Groups are ordered by their first member; a stop joins the first
    /// group whose anchor lies within the tolerance on both axes.
    pub fn collision_groups(&self, stops: &[Stop]) -> Vec<Vec<usize>> {
        if self.config.tolerance_deg == 0.0 {
            exact_groups(stops)
        } else {
            tolerant_groups(stops, self.config.tolerance_deg)
        }
    }

    fn offset(&self, anchor: Position, slot: usize, group_len: usize) -> Position {
        match self.config.strategy {
            PlacementStrategy::Ring => {
                let radius = self.ring_radius(group_len);
                let theta = slot as f64 * (TAU / group_len as f64);
                Position {
                    latitude: anchor.latitude + radius * theta.sin(),
                    longitude: anchor.longitude + radius * theta.cos(),
                }
            }
            PlacementStrategy::Linear => {
                let step = self.config.linear_offset_deg * slot as f64;
                Position {
                    latitude: anchor.latitude + step,
                    longitude: anchor.longitude + step,
                }
            }
        }
    }

    /// Ring radius for a group of `group_len` stops.
    ///
    /// Under tolerant grouping, two ring points must stay further apart than
    /// the tolerance on at least one axis, or a second pass would merge them
    /// again. The per-axis gap of a ring point pair is at least
    /// `√2·r·sin(π/k)`, so the radius grows until that bound is twice the
    /// tolerance.
    fn ring_radius(&self, group_len: usize) -> f64 {
        let radius = self.config.ring_radius_deg();
        let tolerance = self.config.tolerance_deg;
        if tolerance == 0.0 || group_len < 2 {
            return radius;
        }
        let spacing = SQRT_2 * (PI / group_len as f64).sin();
        radius.max(2.0 * tolerance / spacing)
    }
}

fn exact_groups(stops: &[Stop]) -> Vec<Vec<usize>> {
    let mut by_key: HashMap<(u64, u64), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, stop) in stops.iter().enumerate() {
        let key = coordinate_key(stop.position);
        let group = *by_key.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(idx);
    }

    groups
}

fn tolerant_groups(stops: &[Stop], tolerance: f64) -> Vec<Vec<usize>> {
    let mut anchors: Vec<Position> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, stop) in stops.iter().enumerate() {
        let position = stop.position;
        let existing = anchors.iter().position(|anchor| {
            (anchor.latitude - position.latitude).abs() <= tolerance
                && (anchor.longitude - position.longitude).abs() <= tolerance
        });
        match existing {
            Some(group) => groups[group].push(idx),
            None => {
                anchors.push(position);
                groups.push(vec![idx]);
            }
        }
    }

    groups
}

/// Bit pattern key with `-0.0` folded onto `0.0` so equal values share a key
fn coordinate_key(position: Position) -> (u64, u64) {
    ((position.latitude + 0.0).to_bits(), (position.longitude + 0.0).to_bits())
}
