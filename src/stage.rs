//! Core types for the routing pipeline.
//!
//! `RoutingState` is the evolving routing result passed from stage to stage.
//! `RoutingStage` is the trait each stage in the pipeline implements.
//! `RoutingContext` carries everything a stage may read but not change.

use crate::config::PipeConfig;
use crate::direction::Direction;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use crate::pathfinder::GridPathfinder;
use crate::pipeline::CpuBudget;
use crate::visual::Visualization;

/// An output connection point next to a pumpjack, and the facing that puts
/// the pumpjack's output there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Plug {
    pub location: Location,
    pub direction: Direction,
}

#[derive(Clone, Debug)]
pub struct Pumpjack {
    pub id: u32,
    pub center: Location,
    /// Plugs whose cell is not covered by any footprint.
    pub plugs: Vec<Plug>,
}

/// One concrete straight connector between two plugs.
#[derive(Clone, Debug)]
pub struct Connection {
    pub from: Plug,
    pub to: Plug,
    pub path: Vec<Location>,
    /// Manhattan length of the connector.
    pub distance: u32,
}

/// Two neighbouring pumpjacks and every collision-free way to join them.
#[derive(Clone, Debug)]
pub struct CandidateEdge {
    pub endpoints: (usize, usize),
    pub connections: Vec<Connection>,
    pub avg_distance: f64,
    /// Sum of both endpoints' Manhattan distances to the middle of the field.
    pub periphery: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroupMember {
    pub pumpjack: usize,
    pub plug: Plug,
}

/// A connected set of pumpjacks and the pipe paths joining them.
#[derive(Clone, Debug, Default)]
pub struct Group {
    pub members: Vec<GroupMember>,
    pub paths: Vec<Vec<Location>>,
    pub centroid: (f64, f64),
}

impl Group {
    pub fn new(members: Vec<GroupMember>, path: Vec<Location>) -> Group {
        Group {
            members,
            paths: vec![path],
            centroid: (0.0, 0.0),
        }
    }

    pub fn recompute_centroid(&mut self, pumpjacks: &[Pumpjack]) {
        if self.members.is_empty() {
            return;
        }

        let count = self.members.len() as f64;
        let (sx, sy) = self.members.iter().fold((0.0, 0.0), |(sx, sy), m| {
            let (x, y) = pumpjacks[m.pumpjack].center.as_xy();
            (sx + x, sy + y)
        });
        self.centroid = (sx / count, sy / count);
    }

    pub fn total_path_length(&self) -> usize {
        self.paths.iter().map(|p| p.len()).sum()
    }

    /// Every path cell in path order; cells shared between paths repeat.
    pub fn cells(&self) -> Vec<Location> {
        self.paths.iter().flatten().copied().collect()
    }

    pub fn contains(&self, pumpjack: usize) -> bool {
        self.members.iter().any(|m| m.pumpjack == pumpjack)
    }

    /// Take over another group's members and paths, then the path linking them.
    pub fn absorb(&mut self, other: Group, link: Vec<Location>) {
        self.members.extend(other.members);
        self.paths.extend(other.paths);
        self.paths.push(link);
    }
}

/// Final pipe cells once the network has been laid out.
#[derive(Clone, Debug, Default)]
pub struct PipeLayout {
    pub plain: Vec<Location>,
    pub undergrounds: Vec<(Location, Direction)>,
    pub replaced: usize,
}

/// The evolving routing result passed through the pipeline.
#[derive(Clone, Debug, Default)]
pub struct RoutingState {
    pub pumpjacks: Vec<Pumpjack>,
    /// Proximity pairs between pumpjacks that have at least one plug.
    pub neighbor_pairs: Vec<(usize, usize)>,
    pub candidates: Vec<CandidateEdge>,
    /// Groups still being grown or linked.
    pub groups: Vec<Group>,
    /// The network every other pumpjack was joined to.
    pub final_group: Option<Group>,
    /// Groups that could not be linked after every retry.
    pub stranded: Vec<Group>,
    /// Chosen plug per pumpjack, by index into `pumpjacks`.
    pub assigned: Vec<Option<Plug>>,
    /// Pumpjacks with no usable plug or no link to the network.
    pub unattached: Vec<usize>,
    pub layout: PipeLayout,
    pub visualizations: Vec<Visualization>,
}

impl RoutingState {
    pub fn new(pumpjacks: Vec<Pumpjack>) -> RoutingState {
        let assigned = vec![None; pumpjacks.len()];
        let unattached = pumpjacks
            .iter()
            .enumerate()
            .filter(|(_, p)| p.plugs.is_empty())
            .map(|(i, _)| i)
            .collect();

        RoutingState {
            pumpjacks,
            assigned,
            unattached,
            ..Default::default()
        }
    }

    /// Indices of pumpjacks that can take part in routing.
    pub fn routable(&self) -> Vec<usize> {
        self.pumpjacks
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.plugs.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_assigned(&self, pumpjack: usize) -> bool {
        self.assigned[pumpjack].is_some()
    }

    pub fn assign(&mut self, member: GroupMember) {
        self.assigned[member.pumpjack] = Some(member.plug);
    }
}

/// Read-only inputs shared by every stage.
pub struct RoutingContext<'a> {
    pub grid: &'a OccupancyGrid,
    pub indexer: &'a GridIndexer,
    pub pathfinder: &'a dyn GridPathfinder,
    pub config: &'a PipeConfig,
    /// Reference point for periphery scores, in local coordinates.
    pub middle: (f64, f64),
    pub budget: &'a CpuBudget,
}

impl<'a> RoutingContext<'a> {
    /// Fail with `Cancelled` once the budget is spent.
    pub fn check_budget(&self, stage: &str) -> Result<()> {
        if self.budget.has_budget() {
            Ok(())
        } else {
            Err(PlanError::cancelled(stage))
        }
    }

    /// Record a path overlay in world coordinates, if enabled.
    pub fn trace_path(&self, state: &mut RoutingState, path: &[Location], size: u32, alpha: f64) {
        if self.config.visualizations && !path.is_empty() {
            let points = path.iter().map(|&l| self.indexer.to_world(l)).collect();
            state.visualizations.push(Visualization::path(points, size, alpha));
        }
    }
}

/// A single step of the routing pipeline.
pub trait RoutingStage {
    /// Human-readable name for logging and cancellation errors.
    fn name(&self) -> &str;

    fn run(&self, state: &mut RoutingState, ctx: &RoutingContext) -> Result<()>;

    /// Quick check before running. Return false to skip this stage.
    fn is_applicable(&self, _state: &RoutingState) -> bool {
        true
    }
}
