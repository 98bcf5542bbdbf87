pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod footprint;
pub mod grid;
pub mod location;
pub mod pathfinder;
pub mod pipeline;
pub mod placement;
pub mod plan;
pub mod planner;
pub mod stage;
pub mod stages;
pub mod triangulation;

pub mod visual;
pub use visual::*;

pub use config::*;
pub use direction::Direction;
pub use error::{ConfigurationError, PlanError};
pub use location::{Location, WorldPoint};
pub use pipeline::CpuBudget;
pub use placement::{EffectEntity, PowerEntity};
pub use plan::*;
pub use planner::*;
