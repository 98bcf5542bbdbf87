//! Replaces long straight runs of the final network with underground pairs.
//!
//! Runs are the stretches of each path between consecutive corners or
//! junctions. A run end may only go underground if it is a plug cell owned by
//! a single pumpjack with no pipe beside it, otherwise the end stays plain so
//! the side connection survives.

use crate::direction::Direction;
use crate::error::*;
use crate::location::Location;
use crate::stage::*;
use fnv::FnvHashSet;
use itertools::Itertools;
use log::*;
use std::collections::BTreeSet;

pub struct UndergroundStage;

/// Plug cells an underground may start or end on.
fn anchor_cells(group: &Group, pipes: &BTreeSet<Location>) -> FnvHashSet<Location> {
    let plugs: Vec<Plug> = group
        .members
        .iter()
        .map(|m| m.plug)
        .sorted_by_key(|p| p.location)
        .collect();

    plugs
        .iter()
        .enumerate()
        .filter(|(i, plug)| {
            let before = *i > 0 && plugs[i - 1].location == plug.location;
            let after = i + 1 < plugs.len() && plugs[i + 1].location == plug.location;
            !before && !after
        })
        .filter(|(_, plug)| {
            [plug.direction.rotated(2), plug.direction.rotated(6)]
                .iter()
                .filter_map(|&side| plug.location.step(side))
                .all(|cell| !pipes.contains(&cell))
        })
        .map(|(_, plug)| plug.location)
        .collect()
}

/// Straight runs eligible for conversion, each at least `min_gap + 2` long.
fn straight_runs(
    group: &Group,
    intersections: &FnvHashSet<Location>,
    anchors: &FnvHashSet<Location>,
    min_gap: usize,
) -> Vec<Vec<Location>> {
    group
        .paths
        .iter()
        .filter(|path| path.len() >= min_gap.saturating_add(3))
        .flat_map(|path| {
            path.iter()
                .enumerate()
                .filter(|(_, cell)| intersections.contains(*cell))
                .map(|(i, _)| i)
                .tuple_windows()
                .map(move |(start, end)| path[start..=end].to_vec())
        })
        .map(|run| {
            let last = run.len() - 1;
            run.iter()
                .enumerate()
                .filter(|&(i, cell)| (i > 0 && i < last) || anchors.contains(cell))
                .map(|(_, &cell)| cell)
                .collect::<Vec<_>>()
        })
        .filter(|run| run.len() >= min_gap.saturating_add(2))
        .collect()
}

/// Split a run into evenly sized underground pairs no longer than
/// `max_gap + 2` cells.
fn underground_pairs(mut run: Vec<Location>, max_gap: usize) -> Vec<(Location, Direction)> {
    let horizontal = run[0].y() == run[1].y();
    if horizontal {
        run.sort_by_key(|l| l.x());
    } else {
        run.sort_by_key(|l| l.y());
    }

    let (entry, exit) = if horizontal {
        (Direction::West, Direction::East)
    } else {
        (Direction::North, Direction::South)
    };

    let segments = run.len().div_ceil(max_gap.saturating_add(2)).max(1);
    let segment_len = run.len() as f64 / segments as f64;

    (0..segments)
        .flat_map(|i| {
            let start = (segment_len * i as f64).floor() as usize;
            let end = (segment_len * (i + 1) as f64).floor() as usize - 1;
            [(run[start], entry), (run[end], exit)]
        })
        .collect()
}

impl RoutingStage for UndergroundStage {
    fn name(&self) -> &str {
        "undergrounds"
    }

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()> {
        let group = match state.final_group.as_ref() {
            Some(group) => group,
            None => return Ok(()),
        };

        let pipes: BTreeSet<Location> = group.cells().into_iter().collect();
        let intersections: FnvHashSet<Location> = group
            .paths
            .iter()
            .flat_map(|path| ctx.pathfinder.compress_to_waypoints(path))
            .collect();
        let anchors = anchor_cells(group, &pipes);

        let runs = straight_runs(
            group,
            &intersections,
            &anchors,
            ctx.config.min_gap_between_undergrounds,
        );

        let replaced_count: usize = runs.iter().map(|r| r.len()).sum();
        let replaced: FnvHashSet<Location> = runs.iter().flatten().copied().collect();
        let undergrounds: Vec<(Location, Direction)> = runs
            .into_iter()
            .flat_map(|run| underground_pairs(run, ctx.config.max_gap_between_undergrounds))
            .collect();

        let plain: Vec<Location> = pipes.into_iter().filter(|c| !replaced.contains(c)).collect();

        debug!(
            "{} plain pipes, {} undergrounds replacing {} cells",
            plain.len(),
            undergrounds.len(),
            replaced_count
        );

        state.layout.plain = plain;
        state.layout.undergrounds = undergrounds;
        state.layout.replaced = replaced_count;

        Ok(())
    }

    fn is_applicable(&self, state: &RoutingState) -> bool {
        state.final_group.is_some()
    }
}
