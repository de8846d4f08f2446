//! Storage keys and the on-disk board envelope.

use std::fmt;

use scout_core::{MapDimensions, Position, ProbabilityGrid, UnitId};
use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryError, Result};
use crate::utils::hash::board_digest;

/// Identifies boards that can seed each other.
///
/// Two runs share a key when the board size matches and the starting units
/// carry the same weighted coordinate sum, `sum(id * (x + y))`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardKey(String);

impl BoardKey {
    pub fn new(
        dimensions: MapDimensions,
        units: impl IntoIterator<Item = (UnitId, Position)>,
    ) -> Self {
        let signature: i64 = units
            .into_iter()
            .map(|(id, at)| i64::from(id.0) * (i64::from(at.x) + i64::from(at.y)))
            .sum();
        Self(format!(
            "{}x{}_{}",
            dimensions.width, dimensions.height, signature
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versioned, checksummed envelope around an encoded grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub version: u32,
    /// Hex SHA-256 of `grid_bytes`.
    pub digest: String,
    pub grid_bytes: Vec<u8>,
}

impl BoardRecord {
    pub const VERSION: u32 = 1;

    /// Encodes `grid` and stamps it with the current version and digest.
    pub fn seal(grid: &ProbabilityGrid) -> Result<Self> {
        let grid_bytes = grid
            .to_bytes()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Self {
            version: Self::VERSION,
            digest: board_digest(&grid_bytes),
            grid_bytes,
        })
    }

    /// Verifies the envelope and decodes the grid.
    pub fn open(&self) -> Result<ProbabilityGrid> {
        if self.version != Self::VERSION {
            return Err(RepositoryError::CorruptedData(format!(
                "unsupported board version {}",
                self.version
            )));
        }

        let actual = board_digest(&self.grid_bytes);
        if actual != self.digest {
            return Err(RepositoryError::CorruptedData(format!(
                "digest mismatch: expected {}, found {}",
                self.digest, actual
            )));
        }

        ProbabilityGrid::from_bytes(&self.grid_bytes)
            .map_err(|e| RepositoryError::CorruptedData(e.to_string()))
    }
}
