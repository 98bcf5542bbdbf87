//! Attaches pumpjacks that never joined a group to the final network,
//! starting with the ones closest to the middle of the field.

use super::link::best_link;
use crate::error::*;
use crate::location::Location;
use crate::stage::*;
use log::*;

pub struct LeftoverStage;

impl RoutingStage for LeftoverStage {
    fn name(&self) -> &str {
        "leftovers"
    }

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()> {
        let (mid_x, mid_y) = ctx.middle;

        let mut leftovers: Vec<usize> = state
            .routable()
            .into_iter()
            .filter(|&i| !state.is_assigned(i))
            .collect();
        leftovers.sort_by(|&a, &b| {
            let da = state.pumpjacks[a].center.manhattan_distance_to_xy(mid_x, mid_y);
            let db = state.pumpjacks[b].center.manhattan_distance_to_xy(mid_x, mid_y);
            da.total_cmp(&db)
        });

        for pumpjack in leftovers {
            ctx.check_budget(self.name())?;

            let final_group = match state.final_group.as_mut() {
                Some(group) => group,
                None => {
                    state.unattached.push(pumpjack);
                    continue;
                }
            };

            let plugs = state.pumpjacks[pumpjack].plugs.clone();
            let targets: Vec<Vec<Location>> = plugs.iter().map(|p| vec![p.location]).collect();

            match best_link(ctx, &targets, &final_group.cells(), ctx.config.base_max_turns) {
                Some((index, link)) => {
                    let member = GroupMember {
                        pumpjack,
                        plug: plugs[index],
                    };
                    trace!(
                        "leftover pumpjack {} attached facing {:?}",
                        state.pumpjacks[pumpjack].id,
                        member.plug.direction
                    );
                    final_group.members.push(member);
                    final_group.paths.push(link.clone());
                    state.assign(member);
                    ctx.trace_path(state, &link, 8, 0.5);
                }
                None => {
                    warn!(
                        "pumpjack {} could not be attached to the network",
                        state.pumpjacks[pumpjack].id
                    );
                    state.unattached.push(pumpjack);
                }
            }
        }

        Ok(())
    }
}
