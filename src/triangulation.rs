//! Proximity pairs from a Delaunay triangulation.
//!
//! Generators only need "which points are neighbours", so the triangulation
//! is reduced to its edge set. Points are ranked by `(x, y)` and duplicates
//! dropped before anything else happens, so the output only depends on the
//! input order through which of several identical points is kept.

use delaunator::{triangulate, Point, EMPTY};

/// Indices of the distinct points, ordered by `(x, y)`. The first of several
/// identical points is the one kept.
fn unique_order(points: &[(f64, f64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (points[a], points[b]);
        a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
    });
    order.dedup_by(|b, a| points[*a] == points[*b]);
    order
}

/// Every consecutive step has the same absolute slope. A zigzag with equal
/// steps counts too, and is chained like a line.
fn is_chain(points: &[(f64, f64)], order: &[usize]) -> bool {
    let slope = |a: usize, b: usize| {
        let (dx, dy) = (points[b].0 - points[a].0, points[b].1 - points[a].1);
        dy.abs() / dx.abs()
    };

    let mut steps = order.windows(2).map(|w| slope(w[0], w[1]));
    match steps.next() {
        Some(first) => steps.all(|s| s == first),
        None => true,
    }
}

fn chain(order: &[usize]) -> Vec<(usize, usize)> {
    order.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Neighbour pairs of `points`, as indices into `points`.
///
/// Fewer than two distinct points give no pairs. Two points, or points whose
/// consecutive steps share one absolute slope, are chained in `(x, y)` order.
/// Anything else yields every Delaunay edge once, hull edges included.
pub fn point_pairs(points: &[(f64, f64)]) -> Vec<(usize, usize)> {
    let order = unique_order(points);
    if order.len() < 2 {
        return Vec::new();
    }
    if order.len() == 2 || is_chain(points, &order) {
        return chain(&order);
    }

    let sorted: Vec<Point> = order
        .iter()
        .map(|&i| Point {
            x: points[i].0,
            y: points[i].1,
        })
        .collect();
    let triangulation = triangulate(&sorted);

    if triangulation.triangles.is_empty() {
        return chain(&order);
    }

    let next = |i: usize| if i % 3 == 2 { i - 2 } else { i + 1 };
    let triangles = &triangulation.triangles;

    triangulation
        .halfedges
        .iter()
        .enumerate()
        .filter(|&(i, &twin)| twin == EMPTY || i > twin)
        .map(|(i, _)| (order[triangles[i]], order[triangles[next(i)]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> =
            pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        pairs.sort_unstable();
        pairs
    }

    /// Convex hull edges by gift wrapping, skipping any edge with another
    /// point lying on it.
    fn hull_edges(points: &[(f64, f64)]) -> Vec<(usize, usize)> {
        let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
            (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
        };
        let mut edges = Vec::new();
        for a in 0..points.len() {
            for b in 0..points.len() {
                if a == b || points[a] == points[b] {
                    continue;
                }
                let sides: Vec<f64> = (0..points.len())
                    .filter(|&c| points[c] != points[a] && points[c] != points[b])
                    .map(|c| cross(points[a], points[b], points[c]))
                    .collect();
                if sides.iter().all(|&s| s > 0.0) {
                    edges.push((a.min(b), a.max(b)));
                }
            }
        }
        edges
    }

    #[test]
    fn degenerate_inputs() {
        assert!(point_pairs(&[]).is_empty());
        assert!(point_pairs(&[(1.0, 1.0)]).is_empty());
        assert!(point_pairs(&[(1.0, 1.0), (1.0, 1.0)]).is_empty());
        assert_eq!(point_pairs(&[(5.0, 0.0), (1.0, 0.0)]), vec![(1, 0)]);
    }

    #[test]
    fn collinear_points_are_chained() {
        let pairs = point_pairs(&[(0.0, 8.0), (0.0, 0.0), (0.0, 4.0)]);
        assert_eq!(pairs, vec![(1, 2), (2, 0)]);

        let diagonal = point_pairs(&[(6.0, 3.0), (0.0, 0.0), (2.0, 1.0)]);
        assert_eq!(diagonal, vec![(1, 2), (2, 0)]);
    }

    #[test]
    fn equal_zigzag_steps_are_chained() {
        let pairs = point_pairs(&[(0.0, 0.0), (2.0, 2.0), (4.0, 0.0)]);
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn duplicates_keep_the_first_index() {
        let pairs = point_pairs(&[(3.0, 0.0), (0.0, 0.0), (3.0, 0.0)]);
        assert_eq!(pairs, vec![(1, 0)]);
    }

    #[test]
    fn triangle_yields_three_edges() {
        let pairs = point_pairs(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]);
        assert_eq!(undirected(&pairs), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn hull_edge_around_an_inner_point_is_kept() {
        let points = [(13.0, 30.0), (27.0, 13.0), (28.0, 21.0), (40.0, 14.0)];
        let pairs = undirected(&point_pairs(&points));
        assert!(pairs.contains(&(0, 3)), "missing hull edge in {:?}", pairs);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(1, 3)));
        // Three hull edges plus one spoke to the inner point per corner.
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn every_hull_edge_is_a_pair() {
        let mut seed: u64 = 0x2545_f491;
        let mut next = move || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((seed >> 33) % 60) as f64
        };

        for _ in 0..40 {
            let points: Vec<(f64, f64)> = (0..10).map(|_| (next(), next())).collect();
            let pairs = undirected(&point_pairs(&points));
            for edge in hull_edges(&points) {
                let (a, b) = edge;
                let kept = unique_order(&points);
                // Only the kept copy of a duplicated corner can appear.
                if !kept.contains(&a) || !kept.contains(&b) {
                    continue;
                }
                assert!(pairs.contains(&edge), "hull edge {:?} missing for {:?}", edge, points);
            }
        }
    }

    #[test]
    fn far_corners_of_a_grid_are_not_paired() {
        let mut points = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                points.push((x as f64 * 10.0, y as f64 * 10.0));
            }
        }
        let pairs = undirected(&point_pairs(&points));
        // Opposite corners of the 3x3 lattice are never Delaunay neighbours.
        assert!(!pairs.contains(&(0, 8)));
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(0, 3)));
    }

    #[test]
    fn repeated_runs_agree() {
        let a = point_pairs(&[(0.0, 0.0), (6.0, 1.0), (2.0, 7.0), (9.0, 9.0)]);
        let b = point_pairs(&[(0.0, 0.0), (6.0, 1.0), (2.0, 7.0), (9.0, 9.0)]);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
