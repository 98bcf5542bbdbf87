//! Electric pole placement.
//!
//! Poles are chosen greedily by how many still-unpowered consumers they
//! reach. The chosen poles are then grouped by wire reach, and groups are
//! joined by walking extra poles from the smallest group towards its nearest
//! neighbour until one network remains.

use super::*;
use crate::config::PoleConfig;
use crate::constants::*;
use crate::error::*;
use crate::grid::{CellFlags, GridIndexer};
use crate::pipeline::CpuBudget;
use crate::plan::*;
use crate::triangulation::point_pairs;
use crate::visual::Visualization;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const POLE_COLOR: u32 = 0x00bfff;
const CONNECTION_POLE_COLOR: u32 = 0x8a2be2;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerEntity {
    pub position: WorldPoint,
    pub size: u32,
    pub needs_power: bool,
}

impl PowerEntity {
    pub fn new(position: WorldPoint, size: u32, needs_power: bool) -> Self {
        PowerEntity {
            position,
            size,
            needs_power,
        }
    }
}

#[derive(Clone, Debug)]
struct PoleCandidate {
    cell: Location,
    /// Consumers this pole would still power, by footprint index.
    powered: Vec<usize>,
    /// Manhattan distance to the mean centre of the consumers it powers.
    distance: f64,
}

#[derive(Clone, Debug, Default)]
struct PoleGroup {
    poles: Vec<Location>,
    centroid: (f64, f64),
}

impl PoleGroup {
    fn recompute_centroid(&mut self) {
        let count = self.poles.len() as f64;
        let (sx, sy) = self.poles.iter().fold((0.0, 0.0), |(sx, sy), p| {
            let (x, y) = p.as_xy();
            (sx + x, sy + y)
        });
        self.centroid = (sx / count, sy / count);
    }
}

fn search_side(size: u32) -> u32 {
    size + 2 * POLE_SIZE + 2 * (POLE_EFFECT_RADIUS - 1)
}

/// Cells a new pole may take within wire reach of an existing one, row-major.
fn reach_offsets() -> Vec<(i32, i32)> {
    let radius = POLE_TO_POLE_RADIUS as i32;
    square_offsets(2 * POLE_TO_POLE_RADIUS + 1)
        .filter(|&(x, y)| x * x + y * y <= radius * radius)
        .collect()
}

fn pole_candidates(
    footprints: &[Footprint],
    occupancy: &SparseOccupancy,
    indexer: &GridIndexer,
) -> Vec<PoleCandidate> {
    let mut cell_owner: FnvHashMap<Location, usize> = FnvHashMap::default();
    for (index, footprint) in footprints.iter().enumerate() {
        if footprint.active {
            for &cell in &footprint.cells {
                cell_owner.insert(cell, index);
            }
        }
    }

    let cells: BTreeSet<Location> = footprints
        .iter()
        .filter(|f| f.active)
        .flat_map(|f| {
            let center = f.center;
            square_offsets(search_side(f.size))
                .filter_map(move |(dx, dy)| indexer.offset(center, dx, dy))
        })
        .filter(|&cell| occupancy.is_free(cell))
        .collect();

    cells
        .into_iter()
        .map(|cell| {
            let mut powered: Vec<usize> = Vec::new();
            for (dx, dy) in square_offsets(POLE_SIZE + 2 * POLE_EFFECT_RADIUS) {
                if let Some(owner) = cell.checked_offset(dx, dy).and_then(|c| cell_owner.get(&c)) {
                    if !powered.contains(owner) {
                        powered.push(*owner);
                    }
                }
            }

            let distance = if powered.is_empty() {
                0.0
            } else {
                let count = powered.len() as f64;
                let (sx, sy) = powered.iter().fold((0.0, 0.0), |(sx, sy), &f| {
                    let (x, y) = footprints[f].center.as_xy();
                    (sx + x, sy + y)
                });
                cell.manhattan_distance_to_xy(sx / count, sy / count)
            };

            PoleCandidate {
                cell,
                powered,
                distance,
            }
        })
        .filter(|c| !c.powered.is_empty())
        .collect()
}

/// Greedy cover of every consumer.
fn select_poles(mut candidates: Vec<PoleCandidate>, budget: &CpuBudget) -> Result<Vec<Location>> {
    let mut poles = Vec::new();

    while !candidates.is_empty() {
        if !budget.has_budget() {
            return Err(PlanError::cancelled("poles"));
        }

        candidates.sort_by(|a, b| {
            b.powered
                .len()
                .cmp(&a.powered.len())
                .then(a.distance.total_cmp(&b.distance))
        });

        let chosen = candidates.remove(0);
        trace!("pole at {:?} powers {} consumers", chosen.cell, chosen.powered.len());

        let covered: FnvHashSet<usize> = chosen.powered.iter().copied().collect();
        for candidate in candidates.iter_mut() {
            candidate.powered.retain(|f| !covered.contains(f));
        }
        candidates.retain(|c| !c.powered.is_empty());

        poles.push(chosen.cell);
    }

    Ok(poles)
}

/// Union poles within wire reach of each other; isolated poles form their
/// own groups. Groups and their members follow the order in which poles
/// were first wired, then the unwired poles in input order.
fn group_poles(poles: &[Location]) -> Vec<PoleGroup> {
    let coords: Vec<(f64, f64)> = poles.iter().map(|p| p.as_xy()).collect();
    let mut sets = UnionFind::<usize>::new(poles.len());
    let mut wired = vec![false; poles.len()];
    let mut appearance = Vec::with_capacity(poles.len());

    for (a, b) in point_pairs(&coords) {
        if !poles[a].in_circle(poles[b], POLE_TO_POLE_RADIUS) {
            continue;
        }
        for pole in [a, b] {
            if !wired[pole] {
                wired[pole] = true;
                appearance.push(pole);
            }
        }
        sets.union(a, b);
    }
    appearance.extend((0..poles.len()).filter(|&i| !wired[i]));

    let mut groups: Vec<PoleGroup> = Vec::new();
    let mut group_of: FnvHashMap<usize, usize> = FnvHashMap::default();

    for pole in appearance {
        let index = *group_of.entry(sets.find(pole)).or_insert_with(|| {
            groups.push(PoleGroup::default());
            groups.len() - 1
        });
        groups[index].poles.push(poles[pole]);
    }

    groups
}

struct Bridge {
    near: Location,
    far: Location,
    target: usize,
    distance: f64,
}

/// Closest pole pair between `group` and any triangulation neighbour.
fn nearest_bridge(
    group: &PoleGroup,
    others: &[PoleGroup],
    centroids: &[(f64, f64)],
) -> Option<Bridge> {
    point_pairs(centroids)
        .into_iter()
        .filter_map(|(a, b)| match (a, b) {
            (0, other) | (other, 0) => Some(other - 1),
            _ => None,
        })
        .filter_map(|target| {
            let other = &others[target];
            let points: Vec<Location> =
                group.poles.iter().chain(other.poles.iter()).copied().collect();
            let coords: Vec<(f64, f64)> = points.iter().map(|p| p.as_xy()).collect();
            let is_near = |i: usize| i < group.poles.len();

            point_pairs(&coords)
                .into_iter()
                .filter(|&(a, b)| is_near(a) != is_near(b))
                .map(|(a, b)| {
                    let (near, far) = if is_near(a) {
                        (points[a], points[b])
                    } else {
                        (points[b], points[a])
                    };
                    Bridge {
                        near,
                        far,
                        target,
                        distance: near.euclidean_distance_to(far),
                    }
                })
                .min_by(|x, y| x.distance.total_cmp(&y.distance))
        })
        .min_by(|x, y| x.distance.total_cmp(&y.distance))
}

/// Join pole groups until one is left. Returns every pole, the poles added
/// to make connections, and whether the network ended up connected.
fn connect_groups(
    mut groups: Vec<PoleGroup>,
    occupancy: &mut SparseOccupancy,
    indexer: &GridIndexer,
    budget: &CpuBudget,
) -> Result<(Vec<Location>, Vec<Location>, bool)> {
    let offsets = reach_offsets();
    let mut added = Vec::new();

    while groups.len() > 1 {
        if !budget.has_budget() {
            return Err(PlanError::cancelled("poles"));
        }

        for group in groups.iter_mut() {
            group.recompute_centroid();
        }
        groups.sort_by_key(|g| g.poles.len());

        let centroids: Vec<(f64, f64)> = groups.iter().map(|g| g.centroid).collect();
        let mut group = groups.remove(0);

        let bridge = match nearest_bridge(&group, &groups, &centroids) {
            Some(bridge) => bridge,
            None => {
                groups.push(group);
                break;
            }
        };

        let (tx, ty) = if bridge.distance > (POLE_TO_POLE_RADIUS + 2) as f64 {
            bridge.far.as_xy()
        } else {
            let (nx, ny) = bridge.near.as_xy();
            let (fx, fy) = bridge.far.as_xy();
            ((nx + fx) / 2.0, (ny + fy) / 2.0)
        };

        let placed = offsets
            .iter()
            .filter_map(|&(dx, dy)| indexer.offset(bridge.near, dx, dy))
            .filter(|&cell| occupancy.is_free(cell))
            .min_by(|a, b| {
                a.manhattan_distance_to_xy(tx, ty)
                    .total_cmp(&b.manhattan_distance_to_xy(tx, ty))
            });

        let pole = match placed {
            Some(pole) if pole.euclidean_distance_to(bridge.far) < bridge.distance => pole,
            _ => {
                warn!("no pole position brings {:?} closer to {:?}", bridge.near, bridge.far);
                groups.push(group);
                break;
            }
        };

        occupancy.mark(pole, CellFlags::STRUCTURE);
        added.push(pole);

        if pole.in_circle(bridge.far, POLE_TO_POLE_RADIUS) {
            trace!("pole at {:?} joins two groups", pole);
            let target = &mut groups[bridge.target];
            target.poles.extend(group.poles);
            target.poles.push(pole);
        } else {
            trace!("pole at {:?} extends a group towards {:?}", pole, bridge.far);
            group.poles.push(pole);
            groups.push(group);
        }
    }

    let connected = groups.len() <= 1;
    let poles = groups.into_iter().flat_map(|g| g.poles).collect();

    Ok((poles, added, connected))
}

/// Place poles powering every consumer and wire them into one network.
pub fn place_poles(
    entities: &[PowerEntity],
    config: &PoleConfig,
    budget: &CpuBudget,
) -> Result<PolePlan> {
    validate_entities(entities.iter().map(|e| (e.position, e.size)))?;

    if !entities.iter().any(|e| e.needs_power) {
        return Ok(PolePlan::default());
    }

    let max_size = entities.iter().map(|e| e.size).max().unwrap_or(0);
    let margin = search_side(max_size) / 2 + POLE_TO_POLE_RADIUS;
    let indexer = match fit_indexer(entities.iter().map(|e| (e.position, e.size)), margin)? {
        Some(indexer) => indexer,
        None => return Ok(PolePlan::default()),
    };

    let footprints: Vec<Footprint> = entities
        .iter()
        .filter_map(|e| Footprint::new(&indexer, e.position, e.size, e.needs_power))
        .collect();

    let mut occupancy = SparseOccupancy::new();
    for footprint in &footprints {
        for &cell in &footprint.cells {
            occupancy.mark(cell, CellFlags::FOOTPRINT);
        }
    }

    let candidates = pole_candidates(&footprints, &occupancy, &indexer);
    let candidate_count = candidates.len();
    let selected = select_poles(candidates, budget)?;
    for &pole in &selected {
        occupancy.mark(pole, CellFlags::STRUCTURE);
    }

    let groups = group_poles(&selected);
    debug!(
        "{} pole candidates, {} poles selected in {} groups",
        candidate_count,
        selected.len(),
        groups.len()
    );

    let (poles, added, fully_connected) = connect_groups(groups, &mut occupancy, &indexer, budget)?;
    if !fully_connected {
        warn!("pole network is not fully connected");
    }

    let mut visualizations = Vec::new();
    if config.visualizations {
        for (cells, color) in [(&selected, POLE_COLOR), (&added, CONNECTION_POLE_COLOR)] {
            if !cells.is_empty() {
                visualizations.push(Visualization {
                    path: cells.iter().map(|&c| indexer.to_world(c)).collect(),
                    size: 16,
                    alpha: 1.0,
                    color: Some(color),
                });
            }
        }
    }

    Ok(PolePlan {
        info: PoleInfo {
            total_poles: poles.len(),
            fully_connected,
        },
        poles: poles
            .into_iter()
            .map(|p| PlacedEntity::new(POLE_NAME, indexer.to_world(p)))
            .collect(),
        visualizations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: u32, y: u32) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn reach_offsets_form_a_disc() {
        let offsets = reach_offsets();
        assert!(offsets.contains(&(9, 0)));
        assert!(offsets.contains(&(0, -9)));
        assert!(!offsets.contains(&(7, 7)));
        assert!(offsets.contains(&(6, 6)));
        assert_eq!(offsets.first(), Some(&(0, -9)));
    }

    #[test]
    fn poles_within_reach_share_a_group() {
        let poles = vec![loc(10, 10), loc(18, 10), loc(40, 10), loc(10, 17)];
        let groups = group_poles(&poles);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].poles.len(), 3);
        assert_eq!(groups[1].poles, vec![loc(40, 10)]);
    }

    #[test]
    fn groups_follow_wiring_order() {
        let poles = vec![loc(60, 0), loc(30, 0), loc(16, 0), loc(0, 0), loc(38, 0), loc(8, 0)];
        let groups: Vec<Vec<Location>> = group_poles(&poles).into_iter().map(|g| g.poles).collect();
        assert_eq!(
            groups,
            vec![
                vec![loc(0, 0), loc(8, 0), loc(16, 0)],
                vec![loc(30, 0), loc(38, 0)],
                vec![loc(60, 0)],
            ]
        );
    }

    #[test]
    fn greedy_cover_prefers_shared_poles() {
        let candidates = vec![
            PoleCandidate {
                cell: loc(0, 0),
                powered: vec![0],
                distance: 1.0,
            },
            PoleCandidate {
                cell: loc(5, 0),
                powered: vec![0, 1],
                distance: 3.0,
            },
            PoleCandidate {
                cell: loc(9, 0),
                powered: vec![1],
                distance: 0.0,
            },
        ];
        let poles = select_poles(candidates, &CpuBudget::unlimited()).unwrap();
        assert_eq!(poles, vec![loc(5, 0)]);
    }
}
