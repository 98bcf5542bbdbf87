use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Axis-aligned facing, encoded on the 8-way compass used by blueprints
/// (0 = north, 2 = east, 4 = south, 6 = west).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    North = 0,
    East = 2,
    South = 4,
    West = 6,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Rotate by `steps` eighth-turns (only even steps keep the result axis-aligned).
    pub fn rotated(self, steps: u8) -> Direction {
        match (self.value() + steps) % 8 {
            0 => Direction::North,
            2 => Direction::East,
            4 => Direction::South,
            _ => Direction::West,
        }
    }

    /// Unit cell offset, with y growing southwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction.value()
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::North),
            2 => Ok(Direction::East),
            4 => Ok(Direction::South),
            6 => Ok(Direction::West),
            other => Err(format!("{} is not an axis-aligned direction", other)),
        }
    }
}
