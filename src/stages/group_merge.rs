//! Links groups together until one network remains.
//!
//! The group with the least pipe is always linked first, to one of its
//! neighbours in a triangulation of group centroids. Groups that cannot be
//! linked are set aside; once everything else is joined they get another
//! round with one more turn allowed, until the retries run out.

use super::link::best_link;
use crate::error::*;
use crate::location::Location;
use crate::stage::*;
use crate::triangulation::point_pairs;
use log::*;

pub struct GroupMergeStage;

impl RoutingStage for GroupMergeStage {
    fn name(&self) -> &str {
        "group_merge"
    }

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()> {
        let mut groups = std::mem::take(&mut state.groups);
        let mut alone: Vec<Group> = Vec::new();
        let mut tries = ctx.config.max_tries;

        while !groups.is_empty() {
            ctx.check_budget(self.name())?;

            for group in groups.iter_mut() {
                group.recompute_centroid(&state.pumpjacks);
            }
            groups.sort_by_key(|g| g.total_path_length());

            let centroids: Vec<(f64, f64)> = groups.iter().map(|g| g.centroid).collect();
            let group = groups.remove(0);

            if groups.is_empty() {
                if !alone.is_empty() && tries > 0 {
                    debug!(
                        "retrying {} unlinked groups, {} tries left",
                        alone.len(),
                        tries - 1
                    );
                    groups.append(&mut alone);
                    groups.push(group);
                    tries -= 1;
                    continue;
                }
                state.final_group = Some(group);
                break;
            }

            // Index 0 in `centroids` is `group`; everything else is shifted by one.
            let neighbors: Vec<usize> = point_pairs(&centroids)
                .into_iter()
                .filter_map(|(a, b)| match (a, b) {
                    (0, other) | (other, 0) => Some(other - 1),
                    _ => None,
                })
                .collect();

            let targets: Vec<Vec<Location>> =
                neighbors.iter().map(|&i| groups[i].cells()).collect();
            let max_turns = ctx.config.base_max_turns + (ctx.config.max_tries - tries);

            match best_link(ctx, &targets, &group.cells(), max_turns) {
                Some((target, link)) => {
                    trace!(
                        "linked group of {} pumpjacks with {} cells",
                        group.members.len(),
                        link.len()
                    );
                    ctx.trace_path(state, &link, 16, 0.5);
                    groups[neighbors[target]].absorb(group, link);
                }
                None => {
                    trace!(
                        "group of {} pumpjacks has no link within {} turns",
                        group.members.len(),
                        max_turns
                    );
                    alone.push(group);
                }
            }
        }

        if !alone.is_empty() {
            warn!("{} groups could not be linked to the network", alone.len());
        }
        state.stranded = alone;

        Ok(())
    }

    fn is_applicable(&self, state: &RoutingState) -> bool {
        !state.groups.is_empty()
    }
}
