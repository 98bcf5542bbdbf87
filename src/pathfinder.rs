//! Grid search used to link pipes that cannot be joined by a straight run.

use crate::grid::OccupancyGrid;
use crate::location::*;
use pathfinding::directed::bfs::bfs;

/// Shortest-path capability over the occupancy grid.
///
/// Paths include both endpoints. Only cells covered by a facility footprint
/// block movement.
pub trait GridPathfinder {
    fn shortest_path(
        &self,
        grid: &OccupancyGrid,
        from: Location,
        to: Location,
    ) -> Option<Vec<Location>>;

    /// Reduce a path to its start, its end and every corner in between.
    fn compress_to_waypoints(&self, path: &[Location]) -> Vec<Location> {
        compress_path(path)
    }
}

/// Unweighted breadth-first search over 4-connected cells.
///
/// Neighbours are expanded up, right, down, left and the first discovery of a
/// cell wins, so ties between equally short paths always resolve the same way.
#[derive(Clone, Copy, Debug, Default)]
pub struct BreadthFirstPathfinder;

impl GridPathfinder for BreadthFirstPathfinder {
    fn shortest_path(
        &self,
        grid: &OccupancyGrid,
        from: Location,
        to: Location,
    ) -> Option<Vec<Location>> {
        let usable = |loc: Location| grid.in_bounds(loc) && !grid.is_occupied(loc);
        if !usable(from) || !usable(to) {
            return None;
        }

        bfs(&from, |&loc| grid.walkable_neighbors(loc).collect::<Vec<_>>(), |&loc| loc == to)
    }
}

fn step_between(a: Location, b: Location) -> (i64, i64) {
    (
        (b.x() as i64 - a.x() as i64).signum(),
        (b.y() as i64 - a.y() as i64).signum(),
    )
}

/// Collapse runs of collinear cells into their end points.
pub fn compress_path(path: &[Location]) -> Vec<Location> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut waypoints = vec![path[0]];
    let mut heading = step_between(path[0], path[1]);

    for (prev, next) in path.iter().zip(path.iter().skip(1)).skip(1) {
        let step = step_between(*prev, *next);
        if step != heading {
            waypoints.push(*prev);
            heading = step;
        }
    }

    waypoints.extend(path.last().copied());
    waypoints
}

/// Number of corners in a compressed path. A straight path has none; a
/// single cell reports -1.
pub fn turn_count(waypoints: &[Location]) -> i64 {
    waypoints.len() as i64 - 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellFlags;

    fn loc(x: u32, y: u32) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn straight_path_has_no_turns() {
        let path = vec![loc(1, 1), loc(1, 2), loc(1, 3), loc(1, 4)];
        let waypoints = compress_path(&path);
        assert_eq!(waypoints, vec![loc(1, 1), loc(1, 4)]);
        assert_eq!(turn_count(&waypoints), 0);
    }

    #[test]
    fn corners_are_kept() {
        let path = vec![loc(0, 0), loc(1, 0), loc(2, 0), loc(2, 1), loc(2, 2), loc(3, 2)];
        let waypoints = compress_path(&path);
        assert_eq!(waypoints, vec![loc(0, 0), loc(2, 0), loc(2, 2), loc(3, 2)]);
        assert_eq!(turn_count(&waypoints), 2);
    }

    #[test]
    fn search_prefers_vertical_moves_first() {
        let grid = OccupancyGrid::new(5, 5);
        let path = BreadthFirstPathfinder
            .shortest_path(&grid, loc(0, 4), loc(2, 2))
            .unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path[1], loc(0, 3));
        assert_eq!(path.first(), Some(&loc(0, 4)));
        assert_eq!(path.last(), Some(&loc(2, 2)));
    }

    #[test]
    fn search_routes_around_footprints() {
        let mut grid = OccupancyGrid::new(5, 5);
        for y in 0..4 {
            grid.mark(loc(2, y), CellFlags::FOOTPRINT);
        }
        let path = BreadthFirstPathfinder
            .shortest_path(&grid, loc(0, 0), loc(4, 0))
            .unwrap();
        assert!(path.iter().all(|&l| !grid.is_occupied(l)));
        assert!(path.contains(&loc(2, 4)));
    }

    #[test]
    fn walled_off_target_is_unreachable() {
        let mut grid = OccupancyGrid::new(3, 3);
        grid.mark(loc(1, 0), CellFlags::FOOTPRINT);
        grid.mark(loc(1, 1), CellFlags::FOOTPRINT);
        grid.mark(loc(1, 2), CellFlags::FOOTPRINT);
        assert_eq!(BreadthFirstPathfinder.shortest_path(&grid, loc(0, 0), loc(2, 2)), None);
    }
}
