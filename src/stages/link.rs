//! Connector search between two sets of pipe cells.
//!
//! Straight aligned connectors are tried between every pair of cells. The
//! closest cross pairs from a triangulation of both sets are also handed to
//! the pathfinder, keeping paths that turn at least once and at most
//! `max_turns` times.

use crate::constants::*;
use crate::location::*;
use crate::pathfinder::turn_count;
use crate::stage::RoutingContext;
use crate::triangulation::point_pairs;
use itertools::Itertools;
use log::*;

#[derive(Clone, Debug)]
pub struct Link {
    pub path: Vec<Location>,
    pub distance: usize,
    pub turns: i64,
}

/// Straight run of cells between two aligned cells, and its Manhattan length.
pub fn straight_path(a: Location, b: Location) -> (Vec<Location>, u32) {
    let dx = a.x().abs_diff(b.x());
    let dy = a.y().abs_diff(b.y());

    let path = if dx > 0 {
        let min_x = a.x().min(b.x());
        (0..=dx).map(|i| Location::from_coords(min_x + i, a.y())).collect()
    } else {
        let min_y = a.y().min(b.y());
        (0..=dy).map(|i| Location::from_coords(a.x(), min_y + i)).collect()
    };

    (path, dx + dy)
}

/// Every connector from `near` to `far`, shortest first.
///
/// Among equally long connectors, straight ones come first, then searched
/// ones by ascending turn count.
pub fn links_between(
    ctx: &RoutingContext,
    near: &[Location],
    far: &[Location],
    max_turns: u32,
) -> Vec<Link> {
    let mut links: Vec<Link> = near
        .iter()
        .cartesian_product(far.iter())
        .filter(|(a, b)| a.is_aligned_with(**b))
        .map(|(&a, &b)| straight_path(b, a))
        .filter(|(path, _)| path.iter().all(|&cell| !ctx.grid.is_occupied(cell)))
        .map(|(path, distance)| Link {
            path,
            distance: distance as usize,
            turns: 0,
        })
        .collect();

    let far: Vec<Location> = if near.len() == 1 {
        let origin = near[0];
        far.iter()
            .copied()
            .sorted_by_key(|cell| cell.manhattan_distance_to(origin))
            .take(NEAREST_LINK_CELLS)
            .collect()
    } else {
        far.to_vec()
    };

    let points: Vec<Location> = near.iter().chain(far.iter()).copied().collect();
    let coords: Vec<(f64, f64)> = points.iter().map(|l| l.as_xy()).collect();
    let is_near = |index: usize| index < near.len();

    let mut searched: Vec<Link> = point_pairs(&coords)
        .into_iter()
        .filter(|&(a, b)| is_near(a) != is_near(b))
        .map(|(a, b)| (points[a], points[b]))
        .sorted_by_key(|(a, b)| a.manhattan_distance_to(*b))
        .take(SEARCHED_LINKS_PER_GROUP)
        .filter_map(|(a, b)| ctx.pathfinder.shortest_path(ctx.grid, a, b))
        .map(|path| {
            let turns = turn_count(&ctx.pathfinder.compress_to_waypoints(&path));
            Link {
                distance: path.len(),
                path,
                turns,
            }
        })
        .filter(|link| link.turns > 0 && link.turns <= max_turns as i64)
        .collect();

    searched.sort_by_key(|link| link.turns);
    links.extend(searched);
    links.sort_by_key(|link| link.distance);

    trace!(
        "{} connectors between {} and {} cells within {} turns",
        links.len(),
        near.len(),
        far.len(),
        max_turns
    );

    links
}

/// Shortest connector from `source` to any of `targets`. Returns the index
/// of the chosen target and the connector path.
pub fn best_link(
    ctx: &RoutingContext,
    targets: &[Vec<Location>],
    source: &[Location],
    max_turns: u32,
) -> Option<(usize, Vec<Location>)> {
    targets
        .iter()
        .enumerate()
        .filter_map(|(index, target)| {
            links_between(ctx, target, source, max_turns)
                .into_iter()
                .next()
                .map(|link| (index, link))
        })
        .min_by_key(|(_, link)| link.distance)
        .map(|(index, link)| (index, link.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipeConfig;
    use crate::grid::*;
    use crate::pathfinder::BreadthFirstPathfinder;
    use crate::pipeline::CpuBudget;

    fn loc(x: u32, y: u32) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn straight_path_runs_low_to_high() {
        let (path, distance) = straight_path(loc(5, 2), loc(1, 2));
        assert_eq!(distance, 4);
        assert_eq!(path.first(), Some(&loc(1, 2)));
        assert_eq!(path.last(), Some(&loc(5, 2)));
        assert_eq!(path.len(), 5);

        let (single, distance) = straight_path(loc(3, 3), loc(3, 3));
        assert_eq!(distance, 0);
        assert_eq!(single, vec![loc(3, 3)]);
    }

    #[test]
    fn prefers_straight_connectors() {
        let indexer = GridIndexer::fit(vec![(0, 0), (9, 9)], 0).unwrap().unwrap();
        let grid = OccupancyGrid::for_indexer(&indexer);
        let config = PipeConfig::default();
        let budget = CpuBudget::unlimited();
        let ctx = RoutingContext {
            grid: &grid,
            indexer: &indexer,
            pathfinder: &BreadthFirstPathfinder,
            config: &config,
            middle: (5.0, 5.0),
            budget: &budget,
        };

        let near = vec![loc(0, 0), loc(0, 1), loc(0, 2)];
        let far = vec![loc(4, 2), loc(4, 5)];
        let links = links_between(&ctx, &near, &far, 2);
        assert_eq!(links[0].distance, 4);
        assert_eq!(links[0].turns, 0);
        assert!(links.iter().all(|l| l.turns <= 2));
    }

    #[test]
    fn blocked_straight_connector_needs_turns() {
        let indexer = GridIndexer::fit(vec![(0, 0), (9, 9)], 0).unwrap().unwrap();
        let mut grid = OccupancyGrid::for_indexer(&indexer);
        grid.mark(loc(2, 0), CellFlags::FOOTPRINT);
        let config = PipeConfig::default();
        let budget = CpuBudget::unlimited();
        let ctx = RoutingContext {
            grid: &grid,
            indexer: &indexer,
            pathfinder: &BreadthFirstPathfinder,
            config: &config,
            middle: (5.0, 5.0),
            budget: &budget,
        };

        // The first shortest detour the search finds turns four times.
        assert!(links_between(&ctx, &[loc(0, 0)], &[loc(4, 0)], 2).is_empty());

        let links = links_between(&ctx, &[loc(0, 0)], &[loc(4, 0)], 4);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].turns, 4);
        assert_eq!(links[0].distance, 7);
        assert!(!links[0].path.contains(&loc(2, 0)));

        let diagonal = links_between(&ctx, &[loc(0, 0)], &[loc(3, 3)], 2);
        assert_eq!(diagonal.len(), 1);
        assert_eq!(diagonal[0].turns, 1);
        assert_eq!(diagonal[0].path.last(), Some(&loc(3, 3)));
    }
}
