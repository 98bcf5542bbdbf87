//! Square entity footprints and sparse occupancy for the placement generators.

use crate::error::ConfigurationError;
use crate::grid::*;
use crate::location::*;
use fnv::FnvHashMap;

/// World cells covered by a square entity of side `size` centred on
/// `position`, in row-major order.
pub fn footprint_cells(position: WorldPoint, size: u32) -> impl Iterator<Item = (i64, i64)> {
    let (fx, fy) = position.cell();
    let side = size as i64;
    let half = side / 2;
    (0..side * side).map(move |i| (fx + (i % side) - half, fy + (i / side) - half))
}

/// Footprint of one entity on the local grid.
#[derive(Clone, Debug)]
pub struct Footprint {
    /// Cell containing the entity position.
    pub center: Location,
    pub cells: Vec<Location>,
    pub size: u32,
    /// Whether the entity takes part in coverage (receives effects or power).
    pub active: bool,
}

impl Footprint {
    pub fn new(
        indexer: &GridIndexer,
        position: WorldPoint,
        size: u32,
        active: bool,
    ) -> Option<Footprint> {
        let (cx, cy) = position.cell();
        let center = indexer.to_local_cell(cx, cy)?;
        let cells = footprint_cells(position, size)
            .map(|(x, y)| indexer.to_local_cell(x, y))
            .collect::<Option<Vec<_>>>()?;
        Some(Footprint {
            center,
            cells,
            size,
            active,
        })
    }
}

/// Check that a list of square entities can be placed on a grid.
pub fn validate_entities<I>(entities: I) -> Result<(), ConfigurationError>
where
    I: IntoIterator<Item = (WorldPoint, u32)>,
{
    for (index, (position, size)) in entities.into_iter().enumerate() {
        if !position.is_finite() {
            return Err(ConfigurationError::NonFinitePosition {
                index,
                x: position.x,
                y: position.y,
            });
        }
        if size == 0 {
            return Err(ConfigurationError::EmptyFootprint { index, size });
        }
    }
    Ok(())
}

/// Hash-backed occupancy for generators whose entities can be spread far
/// apart, where a dense grid would be mostly empty.
#[derive(Clone, Debug, Default)]
pub struct SparseOccupancy {
    cells: FnvHashMap<Location, CellFlags>,
}

impl SparseOccupancy {
    pub fn new() -> Self {
        SparseOccupancy {
            cells: FnvHashMap::default(),
        }
    }

    pub fn mark(&mut self, loc: Location, flags: CellFlags) {
        *self.cells.entry(loc).or_insert(CellFlags::NONE) |= flags;
    }

    pub fn get(&self, loc: Location) -> CellFlags {
        self.cells.get(&loc).copied().unwrap_or(CellFlags::NONE)
    }

    /// True if nothing covers the cell.
    pub fn is_free(&self, loc: Location) -> bool {
        self.get(loc).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_footprint_is_centred() {
        let cells: Vec<_> = footprint_cells(WorldPoint::new(0.5, 0.5), 3).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], (-1, -1));
        assert_eq!(cells[4], (0, 0));
        assert_eq!(cells[8], (1, 1));
    }

    #[test]
    fn rejects_nan_positions() {
        let result = validate_entities(vec![
            (WorldPoint::new(0.0, 0.0), 3),
            (WorldPoint::new(f64::NAN, 0.0), 3),
        ]);
        assert!(matches!(
            result,
            Err(ConfigurationError::NonFinitePosition { index: 1, .. })
        ));
    }

    #[test]
    fn sparse_flags_accumulate() {
        let mut occupancy = SparseOccupancy::new();
        let loc = Location::from_coords(4, 4);
        assert!(occupancy.is_free(loc));
        occupancy.mark(loc, CellFlags::FOOTPRINT);
        occupancy.mark(loc, CellFlags::STRUCTURE);
        assert!(occupancy.get(loc).contains(CellFlags::FOOTPRINT));
        assert_eq!(occupancy.get(loc), CellFlags::FOOTPRINT | CellFlags::STRUCTURE);
    }
}
