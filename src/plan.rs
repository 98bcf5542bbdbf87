use crate::constants::*;
use crate::direction::Direction;
use crate::location::*;
use crate::visual::*;
use serde::{Deserialize, Serialize};

/// A pumpjack that must face `direction` for its output to meet the network.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacilityRotation {
    pub id: u32,
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeKind {
    Plain,
    Underground,
}

impl PipeKind {
    pub fn entity_name(self) -> &'static str {
        match self {
            PipeKind::Plain => PIPE_NAME,
            PipeKind::Underground => UNDERGROUND_PIPE_NAME,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipeEntity {
    pub kind: PipeKind,
    pub position: WorldPoint,
    /// North for plain pipes; the facing of the pair end for undergrounds.
    pub direction: Direction,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeInfo {
    pub pipe_count: usize,
    pub underground_count: usize,
    pub pipes_replaced_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingDiagnostics {
    /// False when some pumpjacks could not be joined to the main network.
    pub fully_connected: bool,
    /// Pumpjacks left outside the main network, including those that had no
    /// usable plug.
    pub stranded_facilities: Vec<u32>,
}

impl Default for RoutingDiagnostics {
    fn default() -> Self {
        RoutingDiagnostics {
            fully_connected: true,
            stranded_facilities: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipePlan {
    pub facilities_to_rotate: Vec<FacilityRotation>,
    pub pipes: Vec<PipeEntity>,
    pub info: PipeInfo,
    pub visualizations: Vec<Visualization>,
    pub diagnostics: RoutingDiagnostics,
}

impl PipePlan {
    pub fn visualize<V: Visualizer + ?Sized>(&self, visualizer: &mut V) {
        render_all(visualizer, &self.visualizations);
    }

    pub fn plain_pipes(&self) -> impl Iterator<Item = &PipeEntity> {
        self.pipes.iter().filter(|p| p.kind == PipeKind::Plain)
    }

    pub fn underground_pipes(&self) -> impl Iterator<Item = &PipeEntity> {
        self.pipes.iter().filter(|p| p.kind == PipeKind::Underground)
    }
}

/// A placed beacon or pole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub name: String,
    pub position: WorldPoint,
}

impl PlacedEntity {
    pub fn new(name: &str, position: WorldPoint) -> Self {
        PlacedEntity {
            name: name.to_string(),
            position,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BeaconInfo {
    pub total_beacons: usize,
    pub total_effects_given: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BeaconPlan {
    pub beacons: Vec<PlacedEntity>,
    pub info: BeaconInfo,
    pub visualizations: Vec<Visualization>,
}

impl BeaconPlan {
    pub fn visualize<V: Visualizer + ?Sized>(&self, visualizer: &mut V) {
        render_all(visualizer, &self.visualizations);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoleInfo {
    pub total_poles: usize,
    pub fully_connected: bool,
}

impl Default for PoleInfo {
    fn default() -> Self {
        PoleInfo {
            total_poles: 0,
            fully_connected: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolePlan {
    pub poles: Vec<PlacedEntity>,
    pub info: PoleInfo,
    pub visualizations: Vec<Visualization>,
}

impl PolePlan {
    pub fn visualize<V: Visualizer + ?Sized>(&self, visualizer: &mut V) {
        render_all(visualizer, &self.visualizations);
    }
}
