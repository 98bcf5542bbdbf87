//! Builds the pool of straight connector options between neighbouring
//! pumpjacks.
//!
//! Neighbours come from a triangulation of pumpjack centres. For each pair,
//! every plug of one pumpjack is crossed with every plug of the other; aligned
//! plug pairs become straight paths, and paths touching a footprint are
//! discarded. Pairs with nothing left are dropped.

use super::link::straight_path;
use crate::error::*;
use crate::stage::*;
use crate::triangulation::point_pairs;
use itertools::Itertools;
use log::*;

pub struct CandidateEdgeStage;

impl CandidateEdgeStage {
    fn connections(ctx: &RoutingContext, a: &Pumpjack, b: &Pumpjack) -> Vec<Connection> {
        a.plugs
            .iter()
            .cartesian_product(b.plugs.iter())
            .filter(|(pa, pb)| pa.location.is_aligned_with(pb.location))
            .filter_map(|(&from, &to)| {
                let (path, distance) = straight_path(from.location, to.location);
                if path.iter().any(|&cell| ctx.grid.is_occupied(cell)) {
                    return None;
                }
                Some(Connection {
                    from,
                    to,
                    path,
                    distance,
                })
            })
            .collect()
    }
}

impl RoutingStage for CandidateEdgeStage {
    fn name(&self) -> &str {
        "candidate_edges"
    }

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()> {
        let routable = state.routable();
        let centers: Vec<(f64, f64)> = routable
            .iter()
            .map(|&i| state.pumpjacks[i].center.as_xy())
            .collect();

        state.neighbor_pairs = point_pairs(&centers)
            .into_iter()
            .map(|(a, b)| (routable[a], routable[b]))
            .collect();

        let (mid_x, mid_y) = ctx.middle;
        let mut candidates = Vec::new();

        for &(a, b) in &state.neighbor_pairs {
            let pa = &state.pumpjacks[a];
            let pb = &state.pumpjacks[b];
            let connections = Self::connections(ctx, pa, pb);
            if connections.is_empty() {
                continue;
            }

            let total: f64 = connections.iter().map(|c| c.distance as f64).sum();
            let avg_distance = total / connections.len() as f64;
            let periphery = pa.center.manhattan_distance_to_xy(mid_x, mid_y)
                + pb.center.manhattan_distance_to_xy(mid_x, mid_y);

            candidates.push(CandidateEdge {
                endpoints: (a, b),
                connections,
                avg_distance,
                periphery,
            });
        }

        debug!(
            "{} neighbour pairs, {} with straight connectors",
            state.neighbor_pairs.len(),
            candidates.len()
        );

        state.candidates = candidates;

        Ok(())
    }

    fn is_applicable(&self, state: &RoutingState) -> bool {
        state.pumpjacks.len() > 1
    }
}
