use crate::direction::Direction;
use serde::*;

/// A cell on the local (shifted, non-negative) grid.
///
/// Packed as `x << 16 | y` so the derived ordering sorts by `x` then `y`, and
/// the packed value doubles as a dense hash key.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Location {
    packed: u32,
}

impl Location {
    pub fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: ((x & 0xFFFF) << 16) | (y & 0xFFFF),
        }
    }

    #[inline]
    pub fn x(self) -> u32 {
        (self.packed >> 16) & 0xFFFF
    }

    #[inline]
    pub fn y(self) -> u32 {
        self.packed & 0xFFFF
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Location { packed }
    }

    /// Offset by a signed delta, returning `None` when the result would leave
    /// the addressable range.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x() as i64 + dx as i64;
        let y = self.y() as i64 + dy as i64;
        if (0..=0xFFFF).contains(&x) && (0..=0xFFFF).contains(&y) {
            Some(Location::from_coords(x as u32, y as u32))
        } else {
            None
        }
    }

    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        self.checked_offset(dx, dy)
    }

    pub fn manhattan_distance_to(self, other: Self) -> u32 {
        self.x().abs_diff(other.x()) + self.y().abs_diff(other.y())
    }

    /// Manhattan distance to a fractional point (centroids, bounding centres).
    pub fn manhattan_distance_to_xy(self, x: f64, y: f64) -> f64 {
        (self.x() as f64 - x).abs() + (self.y() as f64 - y).abs()
    }

    pub fn euclidean_distance_to(self, other: Self) -> f64 {
        let dx = self.x() as f64 - other.x() as f64;
        let dy = self.y() as f64 - other.y() as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// True if `other` lies within a circle of `radius` around this cell.
    pub fn in_circle(self, other: Self, radius: u32) -> bool {
        let dx = self.x() as i64 - other.x() as i64;
        let dy = self.y() as i64 - other.y() as i64;
        dx * dx + dy * dy <= (radius as i64) * (radius as i64)
    }

    /// Shares a row or a column with `other`.
    pub fn is_aligned_with(self, other: Self) -> bool {
        self.x() == other.x() || self.y() == other.y()
    }

    pub fn as_xy(self) -> (f64, f64) {
        (self.x() as f64, self.y() as f64)
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Location::from_packed)
    }
}

/// A position in world (blueprint) space. Entity positions are usually cell
/// centres such as `(3.5, -1.5)`.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        WorldPoint { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The world cell containing this point.
    pub fn cell(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}
