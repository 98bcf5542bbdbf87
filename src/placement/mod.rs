//! Greedy placement of area-effect structures around facilities.
//!
//! Both generators share the same outline: enumerate candidate cells around
//! the facilities they serve, score each candidate by what it covers, then
//! select greedily.

pub mod beacon;
pub mod pole;

pub use beacon::{place_beacons, BeaconCandidate, EffectEntity};
pub use pole::{place_poles, PowerEntity};

use crate::error::ConfigurationError;
use crate::footprint::*;
use crate::grid::GridIndexer;
use crate::location::*;

/// Offsets covering a `side` x `side` square centred on the origin, row-major.
pub(crate) fn square_offsets(side: u32) -> impl Iterator<Item = (i32, i32)> {
    let side = side as i32;
    let half = side / 2;
    (0..side * side).map(move |i| (i % side - half, i / side - half))
}

/// Fit a local grid around every footprint, with `margin` cells of slack.
pub(crate) fn fit_indexer<I>(
    entities: I,
    margin: u32,
) -> Result<Option<GridIndexer>, ConfigurationError>
where
    I: IntoIterator<Item = (WorldPoint, u32)>,
{
    GridIndexer::fit(
        entities
            .into_iter()
            .flat_map(|(position, size)| footprint_cells(position, size)),
        margin,
    )
}
