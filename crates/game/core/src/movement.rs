//! Single-step movement directions.
use crate::state::Position;

/// One of the eight king moves. `North` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Direction for a unit offset, or `None` for `(0, 0)` and longer jumps.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }

    /// Direction of a single step from `from` to the adjacent cell `to`.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::from_delta(to.x.checked_sub(from.x)?, to.y.checked_sub(from.y)?)
    }

    pub fn apply(self, position: Position) -> Position {
        let (dx, dy) = self.delta();
        position.offset(dx, dy)
    }
}
