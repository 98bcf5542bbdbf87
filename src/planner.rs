//! Public API for the generators.
//!
//! The `PipePlannerBuilder` provides a fluent, append-only API for configuring
//! pipe routing. Stages are added in order and the builder produces a
//! `PipePlanner` that can be run against any number of pumpjack fields.
//! Beacon and pole placement have no stages and are exposed as plain
//! functions.

use crate::config::*;
use crate::constants::*;
use crate::direction::Direction;
use crate::error::*;
use crate::footprint::{footprint_cells, validate_entities};
use crate::grid::*;
use crate::location::*;
use crate::pathfinder::{BreadthFirstPathfinder, GridPathfinder};
use crate::pipeline::{run_stages, CpuBudget};
use crate::placement::{place_beacons, place_poles, EffectEntity, PowerEntity};
use crate::plan::*;
use crate::stage::*;
use crate::stages::default_stages;
use fnv::FnvHashSet;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A pumpjack to connect, identified by the caller's entity number.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PumpjackSpec {
    pub id: u32,
    pub position: WorldPoint,
}

impl PumpjackSpec {
    pub fn new(id: u32, position: WorldPoint) -> Self {
        PumpjackSpec { id, position }
    }
}

/// Append-only builder for configuring pipe routing.
pub struct PipePlannerBuilder {
    stages: Vec<Box<dyn RoutingStage>>,
    config: PipeConfig,
    pathfinder: Box<dyn GridPathfinder>,
}

impl PipePlannerBuilder {
    /// Start with an empty stage stack.
    pub fn new() -> Self {
        PipePlannerBuilder {
            stages: Vec::new(),
            config: PipeConfig::default(),
            pathfinder: Box::new(BreadthFirstPathfinder),
        }
    }

    /// Append a stage to the end of the stack.
    pub fn add_stage(mut self, stage: Box<dyn RoutingStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn config(mut self, config: PipeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the grid search used for turn-permitting links.
    pub fn pathfinder(mut self, pathfinder: Box<dyn GridPathfinder>) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    pub fn build(self) -> PipePlanner {
        PipePlanner {
            stages: self.stages,
            config: self.config,
            pathfinder: self.pathfinder,
        }
    }
}

impl Default for PipePlannerBuilder {
    /// Returns a builder pre-loaded with the default 5-stage stack.
    fn default() -> Self {
        let mut builder = PipePlannerBuilder::new();
        for stage in default_stages() {
            builder.stages.push(stage);
        }
        builder
    }
}

pub struct PipePlanner {
    stages: Vec<Box<dyn RoutingStage>>,
    config: PipeConfig,
    pathfinder: Box<dyn GridPathfinder>,
}

impl PipePlanner {
    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    /// Route pipes connecting every pumpjack into one network.
    pub fn plan(&self, pumpjacks: &[PumpjackSpec], budget: &CpuBudget) -> Result<PipePlan> {
        validate_entities(pumpjacks.iter().map(|p| (p.position, PUMPJACK_SIZE)))?;

        let mut ids = FnvHashSet::default();
        for pumpjack in pumpjacks {
            if !ids.insert(pumpjack.id) {
                return Err(ConfigurationError::DuplicateId(pumpjack.id).into());
            }
        }

        let indexer = match GridIndexer::fit(
            pumpjacks
                .iter()
                .flat_map(|p| footprint_cells(p.position, PUMPJACK_SIZE)),
            self.config.grid_margin,
        )? {
            Some(indexer) => indexer,
            None => return Ok(PipePlan::default()),
        };

        let mut grid = OccupancyGrid::for_indexer(&indexer);
        for pumpjack in pumpjacks {
            for (x, y) in footprint_cells(pumpjack.position, PUMPJACK_SIZE) {
                if let Some(cell) = indexer.to_local_cell(x, y) {
                    grid.mark(cell, CellFlags::FOOTPRINT);
                }
            }
        }

        let routed = pumpjacks
            .iter()
            .filter_map(|p| {
                let center = indexer.to_local(p.position)?;
                let plugs = PUMPJACK_PLUGS
                    .iter()
                    .zip(Direction::ALL.iter())
                    .filter_map(|(&(dx, dy), &direction)| {
                        indexer
                            .offset(center, dx, dy)
                            .filter(|&cell| !grid.is_occupied(cell))
                            .map(|location| Plug { location, direction })
                    })
                    .collect();
                Some(Pumpjack {
                    id: p.id,
                    center,
                    plugs,
                })
            })
            .collect();

        let ctx = RoutingContext {
            grid: &grid,
            indexer: &indexer,
            pathfinder: self.pathfinder.as_ref(),
            config: &self.config,
            middle: indexer.half_extent(),
            budget,
        };

        let mut state = RoutingState::new(routed);
        debug!(
            "routing {} pumpjacks on a {}x{} grid ({} occupied cells)",
            state.pumpjacks.len(),
            grid.width(),
            grid.height(),
            grid.occupied_count()
        );

        run_stages(&self.stages, &mut state, &ctx)?;

        Ok(assemble(state, &indexer))
    }
}

/// Turn the routed state into world-space output.
fn assemble(state: RoutingState, indexer: &GridIndexer) -> PipePlan {
    // Groups a shortened stage stack never merged count as stranded.
    let stranded: Vec<&Group> = state.stranded.iter().chain(state.groups.iter()).collect();
    // Routable pumpjacks that no stage ever placed in a group.
    let unrouted: Vec<usize> = state
        .routable()
        .into_iter()
        .filter(|&i| !state.is_assigned(i) && !state.unattached.contains(&i))
        .collect();

    let facilities_to_rotate = state
        .final_group
        .iter()
        .chain(stranded.iter().copied())
        .flat_map(|g| g.members.iter())
        .map(|m| FacilityRotation {
            id: state.pumpjacks[m.pumpjack].id,
            direction: m.plug.direction,
        })
        .collect();

    // Stranded groups keep their plain pipes; only the final network is
    // optimized with undergrounds.
    let underground_cells: BTreeSet<Location> =
        state.layout.undergrounds.iter().map(|&(l, _)| l).collect();
    let plain: BTreeSet<Location> = state
        .layout
        .plain
        .iter()
        .copied()
        .chain(stranded.iter().flat_map(|g| g.cells()))
        .filter(|cell| !underground_cells.contains(cell))
        .collect();

    let mut pipes: Vec<PipeEntity> = plain
        .iter()
        .map(|&cell| PipeEntity {
            kind: PipeKind::Plain,
            position: indexer.to_world(cell),
            direction: Direction::North,
        })
        .collect();
    pipes.extend(state.layout.undergrounds.iter().map(|&(cell, direction)| PipeEntity {
        kind: PipeKind::Underground,
        position: indexer.to_world(cell),
        direction,
    }));

    let components =
        state.final_group.iter().count() + stranded.len() + state.unattached.len() + unrouted.len();
    let fully_connected = components <= 1;
    let stranded_facilities = if fully_connected {
        Vec::new()
    } else {
        let mut ids: Vec<u32> = stranded
            .iter()
            .flat_map(|g| g.members.iter().map(|m| state.pumpjacks[m.pumpjack].id))
            .chain(state.unattached.iter().map(|&i| state.pumpjacks[i].id))
            .chain(unrouted.iter().map(|&i| state.pumpjacks[i].id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    if !fully_connected {
        warn!(
            "pipe network is split into {} parts, {} pumpjacks outside the main network",
            components,
            stranded_facilities.len()
        );
    }

    let info = PipeInfo {
        pipe_count: plain.len(),
        underground_count: state.layout.undergrounds.len(),
        pipes_replaced_count: state.layout.replaced,
    };
    debug!(
        "placed {} pipes and {} undergrounds replacing {} pipes",
        info.pipe_count, info.underground_count, info.pipes_replaced_count
    );

    PipePlan {
        facilities_to_rotate,
        pipes,
        info,
        visualizations: state.visualizations,
        diagnostics: RoutingDiagnostics {
            fully_connected,
            stranded_facilities,
        },
    }
}

/// Route pipes with the default stage stack and no budget limit.
pub fn generate_pipes(pumpjacks: &[PumpjackSpec], config: &PipeConfig) -> Result<PipePlan> {
    PipePlannerBuilder::default()
        .config(config.clone())
        .build()
        .plan(pumpjacks, &CpuBudget::unlimited())
}

/// Place beacons with no budget limit.
pub fn generate_beacons(entities: &[EffectEntity], config: &BeaconConfig) -> Result<BeaconPlan> {
    place_beacons(entities, config, &CpuBudget::unlimited())
}

/// Place power poles with no budget limit.
pub fn generate_poles(entities: &[PowerEntity], config: &PoleConfig) -> Result<PolePlan> {
    place_poles(entities, config, &CpuBudget::unlimited())
}
