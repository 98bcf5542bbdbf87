//! Local grid support shared by every generator.
//!
//! `GridIndexer` shifts world cells into a dense, non-negative local grid and
//! back. `OccupancyGrid` records which local cells are covered by facility
//! footprints; generators only read it once it has been populated.

use crate::constants::*;
use crate::error::ConfigurationError;
use crate::location::*;
use bitflags::*;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        const NONE = 0;
        /// Covered by a facility footprint.
        const FOOTPRINT = 1;
        /// Taken by a structure the generator placed itself.
        const STRUCTURE = 2;
    }
}

/// Neighbour offsets for 4-directional movement, in the order the search
/// expands them: up, right, down, left.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Maps world cells onto the local grid.
///
/// The offset is the minimum footprint cell minus a fixed margin, so every
/// footprint cell and everything within `margin` of one is addressable.
#[derive(Clone, Debug, PartialEq)]
pub struct GridIndexer {
    min_x: i64,
    min_y: i64,
    margin: u32,
    extent_x: u32,
    extent_y: u32,
}

impl GridIndexer {
    /// Fit an indexer around the given world cells. Returns `Ok(None)` when
    /// there are no cells.
    pub fn fit<I>(cells: I, margin: u32) -> Result<Option<GridIndexer>, ConfigurationError>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut bounds: Option<(i64, i64, i64, i64)> = None;
        for (x, y) in cells {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }

        let (min_x, min_y, max_x, max_y) = match bounds {
            Some(b) => b,
            None => return Ok(None),
        };

        let extent_x = (max_x - min_x + 1) as u64;
        let extent_y = (max_y - min_y + 1) as u64;
        let width = extent_x + 2 * margin as u64;
        let height = extent_y + 2 * margin as u64;
        if width > MAX_GRID_EXTENT as u64 || height > MAX_GRID_EXTENT as u64 {
            return Err(ConfigurationError::GridTooLarge { width, height });
        }

        Ok(Some(GridIndexer {
            min_x,
            min_y,
            margin,
            extent_x: extent_x as u32,
            extent_y: extent_y as u32,
        }))
    }

    pub fn width(&self) -> u32 {
        self.extent_x + 2 * self.margin
    }

    pub fn height(&self) -> u32 {
        self.extent_y + 2 * self.margin
    }

    /// Local cell for a world cell, or `None` if it falls outside the grid.
    pub fn to_local_cell(&self, x: i64, y: i64) -> Option<Location> {
        let lx = x - self.min_x + self.margin as i64;
        let ly = y - self.min_y + self.margin as i64;
        if self.contains(lx, ly) {
            Some(Location::from_coords(lx as u32, ly as u32))
        } else {
            None
        }
    }

    /// Local cell containing a world point.
    pub fn to_local(&self, point: WorldPoint) -> Option<Location> {
        let (x, y) = point.cell();
        self.to_local_cell(x, y)
    }

    /// Centre of a local cell in world space.
    pub fn to_world(&self, loc: Location) -> WorldPoint {
        WorldPoint {
            x: loc.x() as f64 + (self.min_x - self.margin as i64) as f64 + 0.5,
            y: loc.y() as f64 + (self.min_y - self.margin as i64) as f64 + 0.5,
        }
    }

    /// True if the signed local coordinate lies on the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// Offset a local cell, staying on the grid.
    pub fn offset(&self, loc: Location, dx: i32, dy: i32) -> Option<Location> {
        let x = loc.x() as i64 + dx as i64;
        let y = loc.y() as i64 + dy as i64;
        if self.contains(x, y) {
            Some(Location::from_coords(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Half the footprint extent, read as a local coordinate. This ignores
    /// the margin, so it lies up and to the left of the true centre.
    pub fn half_extent(&self) -> (f64, f64) {
        (self.extent_x as f64 / 2.0, self.extent_y as f64 / 2.0)
    }
}

/// Dense per-cell flags over the local grid.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<CellFlags>,
}

impl OccupancyGrid {
    pub fn new(width: u32, height: u32) -> OccupancyGrid {
        OccupancyGrid {
            width,
            height,
            cells: vec![CellFlags::NONE; width as usize * height as usize],
        }
    }

    pub fn for_indexer(indexer: &GridIndexer) -> OccupancyGrid {
        OccupancyGrid::new(indexer.width(), indexer.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, loc: Location) -> Option<usize> {
        if loc.x() < self.width && loc.y() < self.height {
            Some(loc.y() as usize * self.width as usize + loc.x() as usize)
        } else {
            None
        }
    }

    pub fn get(&self, loc: Location) -> CellFlags {
        self.index(loc)
            .map(|i| self.cells[i])
            .unwrap_or(CellFlags::NONE)
    }

    pub fn mark(&mut self, loc: Location, flags: CellFlags) {
        if let Some(i) = self.index(loc) {
            self.cells[i] |= flags;
        }
    }

    pub fn in_bounds(&self, loc: Location) -> bool {
        self.index(loc).is_some()
    }

    /// True if a facility footprint covers the cell.
    pub fn is_occupied(&self, loc: Location) -> bool {
        self.get(loc).contains(CellFlags::FOOTPRINT)
    }

    /// On-grid, unoccupied neighbours in search order.
    pub fn walkable_neighbors(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        NEIGHBORS_4.iter().filter_map(move |&(dx, dy)| {
            let next = loc.checked_offset(dx, dy)?;
            if self.in_bounds(next) && !self.is_occupied(next) {
                Some(next)
            } else {
                None
            }
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.contains(CellFlags::FOOTPRINT))
            .count()
    }
}
