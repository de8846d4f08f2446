//! Repository contract for saving and loading learned boards.

use scout_core::ProbabilityGrid;

use crate::repository::{BoardKey, Result};

/// Repository for board persistence and loading.
///
/// Boards are DYNAMIC data: each finished episode overwrites the board
/// stored under its key.
pub trait BoardRepository: Send + Sync {
    /// Save a board under `key`, replacing any previous one.
    fn save(&self, key: &BoardKey, grid: &ProbabilityGrid) -> Result<()>;

    /// Load the board stored under `key`.
    ///
    /// Returns [`RepositoryError::CorruptedData`](crate::RepositoryError::CorruptedData)
    /// if a stored board fails verification.
    fn load(&self, key: &BoardKey) -> Result<Option<ProbabilityGrid>>;

    /// Check if a board exists
    fn exists(&self, key: &BoardKey) -> bool;

    /// Delete a board
    fn delete(&self, key: &BoardKey) -> Result<()>;

    /// List all stored keys, sorted
    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
