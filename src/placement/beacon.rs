//! Beacon placement.
//!
//! 1. Candidate origins: every free cell in a square around each
//!    effect-receiving facility, wide enough that a beacon there can still
//!    reach the facility.
//! 2. A 3x3 beacon fits at an origin (its top-left cell) when all nine cells
//!    are candidate origins.
//! 3. Each fitting beacon is scored by the facilities inside its 9x9 effect
//!    area, their mean distance, and how many other fitting beacons it
//!    collides with.
//! 4. Beacons are taken best first, skipping any that collide with one
//!    already taken.
//!
//! The scores never change during selection, so candidates are sorted once
//! and swept instead of being re-sorted after every pick.

use super::*;
use crate::config::*;
use crate::constants::*;
use crate::error::*;
use crate::grid::{CellFlags, GridIndexer};
use crate::pipeline::CpuBudget;
use crate::plan::*;
use crate::visual::Visualization;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

const BEACON_COLOR: u32 = 0x800000;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectEntity {
    pub position: WorldPoint,
    pub size: u32,
    /// Whether the entity can receive beacon effects.
    pub provides_effect: bool,
}

impl EffectEntity {
    pub fn new(position: WorldPoint, size: u32, provides_effect: bool) -> Self {
        EffectEntity {
            position,
            size,
            provides_effect,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BeaconCandidate {
    /// Top-left cell of the footprint.
    pub origin: Location,
    pub footprint: Vec<Location>,
    pub effects_given: usize,
    pub avg_distance_to_affected: f64,
    /// Other fitting beacons sharing at least one cell with this one.
    pub overlap_count: usize,
}

impl BeaconCandidate {
    pub fn center(&self) -> Location {
        self.footprint[self.footprint.len() / 2]
    }
}

/// Best first: more effects, then for single coverage the farther beacon,
/// otherwise the one blocking fewer alternatives.
fn compare_candidates(a: &BeaconCandidate, b: &BeaconCandidate) -> Ordering {
    b.effects_given
        .cmp(&a.effects_given)
        .then_with(|| {
            if a.effects_given == 1 {
                b.avg_distance_to_affected.total_cmp(&a.avg_distance_to_affected)
            } else {
                a.overlap_count.cmp(&b.overlap_count)
            }
        })
        .then(a.origin.cmp(&b.origin))
}

fn beacon_footprint(origin: Location, origins: &BTreeSet<Location>) -> Option<Vec<Location>> {
    let size = BEACON_SIZE as i32;
    (0..size * size)
        .map(|i| {
            origin
                .checked_offset(i % size, i / size)
                .filter(|cell| origins.contains(cell))
        })
        .collect()
}

/// Facilities affected by a beacon centred on `center`, in discovery order.
fn affected_facilities(
    center: Location,
    footprints: &[Footprint],
    cell_owner: &FnvHashMap<Location, usize>,
    coverage: CoverageRule,
) -> Vec<usize> {
    let reach = (BEACON_SIZE / 2 + BEACON_EFFECT_RADIUS) as i64;
    let inside = |cell: Location| {
        (cell.x() as i64 - center.x() as i64).abs() <= reach
            && (cell.y() as i64 - center.y() as i64).abs() <= reach
    };

    let mut affected: Vec<usize> = Vec::new();
    for (dx, dy) in square_offsets(BEACON_SIZE + 2 * BEACON_EFFECT_RADIUS) {
        let cell = match center.checked_offset(dx, dy) {
            Some(cell) => cell,
            None => continue,
        };
        let owner = match cell_owner.get(&cell) {
            Some(&owner) => owner,
            None => continue,
        };
        if affected.contains(&owner) {
            continue;
        }
        let counted = match coverage {
            CoverageRule::Full => footprints[owner].cells.iter().all(|&c| inside(c)),
            CoverageRule::Partial => true,
        };
        if counted {
            affected.push(owner);
        }
    }

    affected
}

fn search_side(size: u32) -> u32 {
    size + 2 * BEACON_SIZE + 2 * (BEACON_EFFECT_RADIUS - 1)
}

/// Local grid wide enough for every beacon that could reach an entity.
pub fn beacon_grid(entities: &[EffectEntity]) -> Result<Option<GridIndexer>> {
    let max_size = entities.iter().map(|e| e.size).max().unwrap_or(0);
    let margin = search_side(max_size) / 2 + BEACON_SIZE;
    Ok(fit_indexer(entities.iter().map(|e| (e.position, e.size)), margin)?)
}

/// Score every beacon that fits around the facilities.
pub fn beacon_candidates(
    entities: &[EffectEntity],
    indexer: &GridIndexer,
    config: &BeaconConfig,
) -> Vec<BeaconCandidate> {
    let footprints: Vec<Footprint> = entities
        .iter()
        .filter_map(|e| Footprint::new(indexer, e.position, e.size, e.provides_effect))
        .collect();

    let mut occupancy = SparseOccupancy::new();
    let mut cell_owner: FnvHashMap<Location, usize> = FnvHashMap::default();
    for (index, footprint) in footprints.iter().enumerate() {
        for &cell in &footprint.cells {
            occupancy.mark(cell, CellFlags::FOOTPRINT);
            if footprint.active {
                cell_owner.insert(cell, index);
            }
        }
    }

    let origins: BTreeSet<Location> = footprints
        .iter()
        .filter(|f| f.active)
        .flat_map(|footprint| {
            let center = footprint.center;
            square_offsets(search_side(footprint.size))
                .filter_map(move |(dx, dy)| indexer.offset(center, dx, dy))
        })
        .filter(|&cell| occupancy.is_free(cell))
        .collect();

    let fitting: Vec<(Location, Vec<Location>)> = origins
        .iter()
        .filter_map(|&origin| beacon_footprint(origin, &origins).map(|cells| (origin, cells)))
        .collect();

    let mut cell_to_beacons: FnvHashMap<Location, Vec<usize>> = FnvHashMap::default();
    for (index, (_, cells)) in fitting.iter().enumerate() {
        for &cell in cells {
            cell_to_beacons.entry(cell).or_default().push(index);
        }
    }

    let candidates: Vec<BeaconCandidate> = fitting
        .iter()
        .enumerate()
        .map(|(index, (origin, cells))| {
            let overlapping: FnvHashSet<usize> = cells
                .iter()
                .flat_map(|cell| cell_to_beacons.get(cell).into_iter().flatten().copied())
                .filter(|&other| other != index)
                .collect();

            let center = cells[cells.len() / 2];
            let affected = affected_facilities(center, &footprints, &cell_owner, config.coverage);
            let avg_distance_to_affected = if affected.is_empty() {
                0.0
            } else {
                affected
                    .iter()
                    .map(|&f| footprints[f].center.manhattan_distance_to(center) as f64)
                    .sum::<f64>()
                    / affected.len() as f64
            };

            BeaconCandidate {
                origin: *origin,
                footprint: cells.clone(),
                effects_given: affected.len(),
                avg_distance_to_affected,
                overlap_count: overlapping.len(),
            }
        })
        .filter(|c| c.effects_given >= config.min_affected_entities)
        .collect();

    debug!(
        "{} candidate origins, {} fitting beacons, {} above threshold",
        origins.len(),
        fitting.len(),
        candidates.len()
    );

    candidates
}

/// Place beacons around the effect-receiving entities.
pub fn place_beacons(
    entities: &[EffectEntity],
    config: &BeaconConfig,
    budget: &CpuBudget,
) -> Result<BeaconPlan> {
    validate_entities(entities.iter().map(|e| (e.position, e.size)))?;

    if !entities.iter().any(|e| e.provides_effect) {
        return Ok(BeaconPlan::default());
    }

    let indexer = match beacon_grid(entities)? {
        Some(indexer) => indexer,
        None => return Ok(BeaconPlan::default()),
    };

    let mut candidates = beacon_candidates(entities, &indexer, config);
    candidates.sort_by(compare_candidates);

    let mut blocked: FnvHashSet<Location> = FnvHashSet::default();
    let mut selected: Vec<BeaconCandidate> = Vec::new();

    for candidate in candidates {
        if !budget.has_budget() {
            return Err(PlanError::cancelled("beacons"));
        }
        if candidate.footprint.iter().any(|cell| blocked.contains(cell)) {
            continue;
        }
        trace!(
            "beacon at {:?} affects {} entities",
            candidate.center(),
            candidate.effects_given
        );
        blocked.extend(candidate.footprint.iter().copied());
        selected.push(candidate);
    }

    let positions: Vec<WorldPoint> =
        selected.iter().map(|c| indexer.to_world(c.center())).collect();

    let mut visualizations = Vec::new();
    if config.visualizations && !positions.is_empty() {
        visualizations.push(Visualization {
            path: positions.clone(),
            size: 16,
            alpha: 1.0,
            color: Some(BEACON_COLOR),
        });
    }

    let info = BeaconInfo {
        total_beacons: selected.len(),
        total_effects_given: selected.iter().map(|c| c.effects_given).sum(),
    };

    debug!(
        "placed {} beacons giving {} effects",
        info.total_beacons, info.total_effects_given
    );

    Ok(BeaconPlan {
        beacons: positions
            .into_iter()
            .map(|p| PlacedEntity::new(BEACON_NAME, p))
            .collect(),
        info,
        visualizations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(effects: usize, avg: f64, overlaps: usize, x: u32) -> BeaconCandidate {
        BeaconCandidate {
            origin: Location::from_coords(x, 0),
            footprint: Vec::new(),
            effects_given: effects,
            avg_distance_to_affected: avg,
            overlap_count: overlaps,
        }
    }

    #[test]
    fn more_effects_win() {
        let a = candidate(2, 1.0, 50, 0);
        let b = candidate(1, 9.0, 0, 1);
        assert_eq!(compare_candidates(&a, &b), Ordering::Less);
    }

    #[test]
    fn single_coverage_prefers_distance() {
        let near = candidate(1, 3.0, 0, 0);
        let far = candidate(1, 6.0, 30, 1);
        assert_eq!(compare_candidates(&far, &near), Ordering::Less);
    }

    #[test]
    fn shared_coverage_prefers_fewer_overlaps() {
        let busy = candidate(3, 6.0, 30, 0);
        let quiet = candidate(3, 1.0, 4, 1);
        assert_eq!(compare_candidates(&quiet, &busy), Ordering::Less);
    }

    fn candidates_for(
        entities: &[EffectEntity],
        config: &BeaconConfig,
    ) -> (GridIndexer, Vec<BeaconCandidate>) {
        let indexer = beacon_grid(entities).unwrap().unwrap();
        let candidates = beacon_candidates(entities, &indexer, config);
        (indexer, candidates)
    }

    #[test]
    fn full_coverage_ignores_partially_covered_facilities() {
        let entities = vec![EffectEntity::new(WorldPoint::new(0.5, 0.5), 3, true)];
        let (_, full) = candidates_for(&entities, &BeaconConfig::default());
        let (_, partial) = candidates_for(
            &entities,
            &BeaconConfig {
                coverage: CoverageRule::Partial,
                ..Default::default()
            },
        );
        assert!(partial.len() > full.len());
        assert!(full.iter().all(|c| c.effects_given == 1));
    }

    #[test]
    fn footprints_avoid_every_entity() {
        let entities = vec![
            EffectEntity::new(WorldPoint::new(0.5, 0.5), 3, true),
            EffectEntity::new(WorldPoint::new(4.5, 0.5), 3, false),
        ];
        let (indexer, candidates) = candidates_for(&entities, &BeaconConfig::default());
        let occupied: FnvHashSet<Location> = entities
            .iter()
            .flat_map(|e| footprint_cells(e.position, e.size))
            .filter_map(|(x, y)| indexer.to_local_cell(x, y))
            .collect();

        assert!(!candidates.is_empty());
        assert!(candidates
            .iter()
            .all(|c| c.footprint.iter().all(|cell| !occupied.contains(cell))));
    }
}
