use std::fmt;

use crate::env::MapDimensions;
use crate::error::{CoreError, ErrorSeverity};
use crate::state::{Cell, CellFlags, Position};

/// Errors raised at the grid boundary.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Coordinate lies outside `[0, width) x [0, height)`.
    #[error("position {position} is outside the {}x{} grid", .dimensions.width, .dimensions.height)]
    OutOfBounds {
        position: Position,
        dimensions: MapDimensions,
    },

    /// Decoded board does not describe a consistent grid.
    #[error("malformed board: {0}")]
    Malformed(&'static str),

    #[error("failed to encode board: {0}")]
    Encode(String),

    #[error("failed to decode board: {0}")]
    Decode(String),
}

impl CoreError for GridError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            GridError::OutOfBounds { .. } | GridError::Malformed(_) | GridError::Decode(_) => {
                ErrorSeverity::Validation
            }
            GridError::Encode(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GridError::OutOfBounds { .. } => "GRID_OUT_OF_BOUNDS",
            GridError::Malformed(_) => "GRID_MALFORMED",
            GridError::Encode(_) => "GRID_ENCODE",
            GridError::Decode(_) => "GRID_DECODE",
        }
    }
}

/// Episode-scoped belief over tower locations.
///
/// The grid is a single-owner resource: the host creates it at episode start
/// (fresh or from a persisted board), hands it to the tracker, and takes it
/// back at episode end for persistence.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbabilityGrid {
    dimensions: MapDimensions,
    cells: Vec<Cell>,
}

impl ProbabilityGrid {
    /// Creates a grid where every cell holds the same prior.
    pub fn new(dimensions: MapDimensions, prior: f32) -> Self {
        Self {
            dimensions,
            cells: vec![Cell::with_prior(prior); dimensions.area()],
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    fn index(&self, position: Position) -> Result<usize, GridError> {
        self.dimensions
            .index_of(position)
            .ok_or(GridError::OutOfBounds {
                position,
                dimensions: self.dimensions,
            })
    }

    pub fn cell(&self, position: Position) -> Result<&Cell, GridError> {
        let index = self.index(position)?;
        Ok(&self.cells[index])
    }

    fn cell_mut(&mut self, position: Position) -> Result<&mut Cell, GridError> {
        let index = self.index(position)?;
        Ok(&mut self.cells[index])
    }

    pub fn probability(&self, position: Position) -> Result<f32, GridError> {
        Ok(self.cell(position)?.tower_probability())
    }

    /// Writes a tower probability; values outside `[0, 1]` are clamped.
    pub fn set_probability(
        &mut self,
        position: Position,
        probability: f32,
    ) -> Result<(), GridError> {
        self.cell_mut(position)?.set_tower_probability(probability);
        Ok(())
    }

    pub fn is_seen(&self, position: Position) -> Result<bool, GridError> {
        Ok(self.cell(position)?.is_seen())
    }

    pub fn set_seen(&mut self, position: Position, seen: bool) -> Result<(), GridError> {
        self.cell_mut(position)?.set_flag(CellFlags::SEEN, seen);
        Ok(())
    }

    pub fn has_obstacle(&self, position: Position) -> Result<bool, GridError> {
        Ok(self.cell(position)?.has_obstacle())
    }

    pub fn set_obstacle(&mut self, position: Position, obstacle: bool) -> Result<(), GridError> {
        self.cell_mut(position)?.set_flag(CellFlags::OBSTACLE, obstacle);
        Ok(())
    }

    pub fn increment_visit(&mut self, position: Position) -> Result<(), GridError> {
        self.cell_mut(position)?.record_visit();
        Ok(())
    }

    pub fn increment_hits(&mut self, position: Position) -> Result<(), GridError> {
        self.cell_mut(position)?.record_hit();
        Ok(())
    }

    /// Immutable copy of the probability field at this instant.
    pub fn snapshot(&self) -> ProbabilitySnapshot {
        ProbabilitySnapshot {
            dimensions: self.dimensions,
            values: self.cells.iter().map(Cell::tower_probability).collect(),
        }
    }

    /// Iterates `(position, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.dimensions.positions().zip(self.cells.iter())
    }

    /// Checks the invariants a decoded board must satisfy.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.cells.len() != self.dimensions.area() {
            return Err(GridError::Malformed("cell count does not match dimensions"));
        }
        let in_range = |p: f32| (0.0..=1.0).contains(&p);
        if !self.cells.iter().all(|c| in_range(c.tower_probability())) {
            return Err(GridError::Malformed("tower probability outside [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl ProbabilityGrid {
    /// Encodes the whole board (probabilities, flags, counters) as bincode.
    ///
    /// `f32` values are written bit-for-bit, so a round trip is exact.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GridError> {
        bincode::serialize(self).map_err(|e| GridError::Encode(e.to_string()))
    }

    /// Decodes a board produced by [`ProbabilityGrid::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        let grid: Self =
            bincode::deserialize(bytes).map_err(|e| GridError::Decode(e.to_string()))?;
        grid.validate()?;
        Ok(grid)
    }
}

/// Text dump of the board: one row per line, `#` for obstacles.
impl fmt::Display for ProbabilityGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.dimensions.width.max(1) as usize) {
            let mut first = true;
            for cell in row {
                if !first {
                    f.write_str(" ")?;
                }
                first = false;
                if cell.has_obstacle() {
                    f.write_str("  # ")?;
                } else {
                    write!(f, "{:.2}", cell.tower_probability())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Read-only copy of the probability field.
///
/// Evidence updates read priors from a snapshot while writing posteriors to
/// the live grid, so no posterior depends on another from the same call.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilitySnapshot {
    dimensions: MapDimensions,
    values: Vec<f32>,
}

impl ProbabilitySnapshot {
    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    /// Probability at `position`, or `None` outside the grid.
    pub fn get(&self, position: Position) -> Option<f32> {
        self.dimensions
            .index_of(position)
            .map(|index| self.values[index])
    }
}
