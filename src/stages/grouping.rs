//! Grows groups of pumpjacks from the candidate edge pool.
//!
//! Each round the pool is re-sorted, because whether an edge continues an
//! existing group changes as pumpjacks are added. The top edge is consumed
//! and its first applicable connection is used.

use crate::error::*;
use crate::location::Location;
use crate::stage::*;
use log::*;
use std::cmp::Ordering;

pub struct GroupingStage;

/// An edge continues a group when one of its endpoints is already a member
/// and some connection, on either side, uses a plug facing the same way as
/// that member's chosen plug.
fn continues_group(edge: &CandidateEdge, assigned: &[Option<Plug>]) -> bool {
    let (a, b) = edge.endpoints;
    [a, b].iter().filter_map(|&p| assigned[p]).any(|plug| {
        edge.connections
            .iter()
            .any(|c| c.from.direction == plug.direction || c.to.direction == plug.direction)
    })
}

fn compare_edges(x: &CandidateEdge, y: &CandidateEdge, assigned: &[Option<Plug>]) -> Ordering {
    continues_group(y, assigned)
        .cmp(&continues_group(x, assigned))
        .then(y.periphery.total_cmp(&x.periphery))
        .then(x.connections.len().cmp(&y.connections.len()))
        .then(x.avg_distance.total_cmp(&y.avg_distance))
}

fn group_index_of(groups: &[Group], pumpjack: usize) -> Option<usize> {
    groups.iter().position(|g| g.contains(pumpjack))
}

impl GroupingStage {
    /// Apply the first usable connection of an edge. Returns false if none
    /// applied.
    fn apply_edge(state: &mut RoutingState, ctx: &RoutingContext, edge: CandidateEdge) -> bool {
        let (a, b) = edge.endpoints;
        let (mid_x, mid_y) = ctx.middle;

        let mut connections = edge.connections;
        connections.sort_by(|x, y| {
            x.distance.cmp(&y.distance).then(
                x.from
                    .location
                    .manhattan_distance_to_xy(mid_x, mid_y)
                    .total_cmp(&y.from.location.manhattan_distance_to_xy(mid_x, mid_y)),
            )
        });

        for connection in connections {
            let member_a = GroupMember {
                pumpjack: a,
                plug: connection.from,
            };
            let member_b = GroupMember {
                pumpjack: b,
                plug: connection.to,
            };

            match (state.assigned[a], state.assigned[b]) {
                (None, None) => {
                    trace!("new group from pumpjacks {} and {}", a, b);
                    state.groups.push(Group::new(vec![member_a, member_b], connection.path));
                    state.assign(member_a);
                    state.assign(member_b);
                    return true;
                }
                (None, Some(plug)) if plug.direction == connection.to.direction => {
                    if let Some(index) = group_index_of(&state.groups, b) {
                        trace!("pumpjack {} joins the group of {}", a, b);
                        let group = &mut state.groups[index];
                        group.members.push(member_a);
                        group.paths.push(connection.path);
                        state.assign(member_a);
                        return true;
                    }
                }
                (Some(plug), None) if plug.direction == connection.from.direction => {
                    if let Some(index) = group_index_of(&state.groups, a) {
                        trace!("pumpjack {} joins the group of {}", b, a);
                        let group = &mut state.groups[index];
                        group.members.push(member_b);
                        group.paths.push(connection.path);
                        state.assign(member_b);
                        return true;
                    }
                }
                _ => {}
            }
        }

        false
    }

    /// Seed a single group from the shortest searched connection between any
    /// neighbouring pair. Used when no straight connector could be grown.
    fn seed_from_search(state: &mut RoutingState, ctx: &RoutingContext) {
        let mut best: Option<(GroupMember, GroupMember, Vec<Location>)> = None;

        for &(a, b) in &state.neighbor_pairs {
            let pa = &state.pumpjacks[a];
            let pb = &state.pumpjacks[b];

            let mut pair_best: Option<(GroupMember, GroupMember, Vec<Location>)> = None;
            for from in &pa.plugs {
                for to in &pb.plugs {
                    let found = ctx.pathfinder.shortest_path(ctx.grid, from.location, to.location);
                    let path = match found {
                        Some(path) => path,
                        None => continue,
                    };
                    let shorter = pair_best
                        .as_ref()
                        .map(|(_, _, p)| path.len() < p.len())
                        .unwrap_or(true);
                    if shorter {
                        pair_best = Some((
                            GroupMember {
                                pumpjack: a,
                                plug: *from,
                            },
                            GroupMember {
                                pumpjack: b,
                                plug: *to,
                            },
                            path,
                        ));
                    }
                }
            }

            if let Some(candidate) = pair_best {
                let shorter = best
                    .as_ref()
                    .map(|(_, _, p)| candidate.2.len() < p.len())
                    .unwrap_or(true);
                if shorter {
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some((member_a, member_b, path)) => {
                debug!(
                    "no straight groups, seeding from searched connection of {} cells",
                    path.len()
                );
                state.groups.push(Group::new(vec![member_a, member_b], path));
                state.assign(member_a);
                state.assign(member_b);
            }
            None => {
                debug!("no neighbouring pumpjacks can be connected");
            }
        }
    }
}

impl RoutingStage for GroupingStage {
    fn name(&self) -> &str {
        "grouping"
    }

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()> {
        let mut pool = std::mem::take(&mut state.candidates);

        while !pool.is_empty() {
            ctx.check_budget(self.name())?;

            pool.sort_by(|x, y| compare_edges(x, y, &state.assigned));
            let edge = pool.remove(0);
            let endpoints = edge.endpoints;
            if !Self::apply_edge(state, ctx, edge) {
                trace!("edge {:?} consumed without a usable connection", endpoints);
            }
        }

        if state.groups.is_empty() {
            Self::seed_from_search(state, ctx);
        }

        let paths: Vec<_> = state.groups.iter().map(|g| g.cells()).collect();
        for path in paths {
            ctx.trace_path(state, &path, 32, 0.5);
        }

        debug!(
            "{} groups covering {} pumpjacks",
            state.groups.len(),
            state.assigned.iter().filter(|a| a.is_some()).count()
        );

        Ok(())
    }

    fn is_applicable(&self, state: &RoutingState) -> bool {
        !state.neighbor_pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    fn plug(x: u32, y: u32, direction: Direction) -> Plug {
        Plug {
            location: Location::from_coords(x, y),
            direction,
        }
    }

    fn edge(
        endpoints: (usize, usize),
        connections: Vec<(Plug, Plug, u32)>,
        periphery: f64,
    ) -> CandidateEdge {
        let connections: Vec<Connection> = connections
            .into_iter()
            .map(|(from, to, distance)| Connection {
                from,
                to,
                path: Vec::new(),
                distance,
            })
            .collect();
        let avg_distance =
            connections.iter().map(|c| c.distance as f64).sum::<f64>() / connections.len() as f64;
        CandidateEdge {
            endpoints,
            connections,
            avg_distance,
            periphery,
        }
    }

    #[test]
    fn continuing_edges_come_first() {
        let west = plug(0, 0, Direction::West);
        let east = plug(1, 0, Direction::East);
        let assigned = vec![Some(west), None, None, None];

        let outer = edge((2, 3), vec![(east, west, 3)], 40.0);
        let continuing = edge((0, 1), vec![(west, east, 9)], 1.0);

        assert!(continues_group(&continuing, &assigned));
        assert!(!continues_group(&outer, &assigned));
        assert_eq!(compare_edges(&continuing, &outer, &assigned), Ordering::Less);
    }

    #[test]
    fn continuation_matches_either_side() {
        let west = plug(0, 0, Direction::West);
        let east = plug(1, 0, Direction::East);
        let north = plug(0, 1, Direction::North);

        // Pumpjack 0 faces west; the edge reaches it through an east plug but
        // the far side leaves through a west plug.
        let assigned = vec![Some(west), None];
        let e = edge((0, 1), vec![(east, west, 3)], 0.0);
        assert!(continues_group(&e, &assigned));

        let assigned = vec![None, Some(north)];
        assert!(!continues_group(&e, &assigned));
    }

    #[test]
    fn outer_edges_then_fewer_connections_then_shorter() {
        let assigned = vec![None; 6];
        let n = plug(0, 0, Direction::North);
        let s = plug(0, 4, Direction::South);

        let outer = edge((0, 1), vec![(n, s, 8)], 30.0);
        let inner = edge((2, 3), vec![(n, s, 2)], 10.0);
        assert_eq!(compare_edges(&outer, &inner, &assigned), Ordering::Less);

        let single = edge((0, 1), vec![(n, s, 8)], 10.0);
        let double = edge((2, 3), vec![(n, s, 2), (s, n, 2)], 10.0);
        assert_eq!(compare_edges(&single, &double, &assigned), Ordering::Less);

        let short = edge((0, 1), vec![(n, s, 2)], 10.0);
        let long = edge((4, 5), vec![(n, s, 6)], 10.0);
        assert_eq!(compare_edges(&short, &long, &assigned), Ordering::Less);
    }
}
