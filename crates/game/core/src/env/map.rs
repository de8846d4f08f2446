use crate::belief::Sighting;
use crate::state::Position;

/// Live view of the host world consulted while expanding search successors.
///
/// The belief grid only knows what has been observed; transient blockers such
/// as other units or friendly structures come from the host each tick.
pub trait WorldOracle {
    /// Returns true when another tracked unit currently stands on `position`.
    fn is_occupied(&self, position: Position) -> bool;

    /// Returns true when `position` holds a structure that may only be entered
    /// as the final step of a path (for example a town hall used as drop-off).
    fn is_rally_point(&self, position: Position) -> bool {
        let _ = position;
        false
    }
}

/// World oracle for an empty field: nothing occupied, no rally points.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenField;

impl WorldOracle for OpenField {
    fn is_occupied(&self, _position: Position) -> bool {
        false
    }
}

impl<W: WorldOracle + ?Sized> WorldOracle for &W {
    fn is_occupied(&self, position: Position) -> bool {
        (**self).is_occupied(position)
    }

    fn is_rally_point(&self, position: Position) -> bool {
        (**self).is_rally_point(position)
    }
}

/// What a unit standing nearby would see on a cell.
///
/// Queried once per cell of each unit's vision window.
pub trait VisionOracle {
    fn sighting(&self, position: Position) -> Sighting;
}

impl<V: VisionOracle + ?Sized> VisionOracle for &V {
    fn sighting(&self, position: Position) -> Sighting {
        (**self).sighting(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of an in-bounds position.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    /// Iterates every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }
}
