/// Side length of a pumpjack footprint.
pub const PUMPJACK_SIZE: u32 = 3;

/// Output fluid box connection offsets of a pumpjack, relative to its centre
/// cell, indexed by facing (north, east, south, west).
pub const PUMPJACK_PLUGS: [(i32, i32); 4] = [(1, -2), (2, -1), (-1, 2), (-2, 1)];

/// Empty border added around the routing grid so plugs and links on the
/// outermost facilities stay addressable.
pub const GRID_MARGIN: u32 = 2;

/// Number of times groups that could not be linked are retried, each retry
/// allowing one more turn in the connecting path.
pub const MAX_TRIES: u32 = 3;

/// Turn budget for the first group linking round.
pub const BASE_MAX_TURNS: u32 = 2;

pub const MIN_GAP_BETWEEN_UNDERGROUNDS: usize = 1;
pub const MAX_GAP_BETWEEN_UNDERGROUNDS: usize = 9;

/// Number of nearest cells of the target group considered when linking a
/// single-cell source (leftover plugs).
pub const NEAREST_LINK_CELLS: usize = 20;

/// Number of closest cross-group pairs handed to the pathfinder per group pair.
pub const SEARCHED_LINKS_PER_GROUP: usize = 5;

pub const BEACON_SIZE: u32 = 3;
pub const BEACON_EFFECT_RADIUS: u32 = 3;
pub const MIN_AFFECTED_ENTITIES: usize = 1;

pub const POLE_SIZE: u32 = 1;
pub const POLE_EFFECT_RADIUS: u32 = 3;
pub const POLE_TO_POLE_RADIUS: u32 = 9;

pub const BEACON_NAME: &str = "beacon";
pub const POLE_NAME: &str = "medium-electric-pole";
pub const PIPE_NAME: &str = "pipe";
pub const UNDERGROUND_PIPE_NAME: &str = "pipe-to-ground";

/// Largest local grid extent a `Location` can address.
pub const MAX_GRID_EXTENT: u32 = u16::MAX as u32;
