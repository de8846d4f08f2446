//! In-memory BoardRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use scout_core::ProbabilityGrid;

use crate::repository::{BoardKey, BoardRecord, BoardRepository, RepositoryError, Result};

/// In-memory implementation of BoardRepository.
///
/// Keeps sealed records so loads go through the same verification as files.
pub struct InMemoryBoardRepository {
    boards: RwLock<HashMap<String, BoardRecord>>,
}

impl InMemoryBoardRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            boards: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBoardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardRepository for InMemoryBoardRepository {
    fn save(&self, key: &BoardKey, grid: &ProbabilityGrid) -> Result<()> {
        let record = BoardRecord::seal(grid)?;
        let mut boards = self
            .boards
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        boards.insert(key.as_str().to_string(), record);
        Ok(())
    }

    fn load(&self, key: &BoardKey) -> Result<Option<ProbabilityGrid>> {
        let boards = self
            .boards
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        boards.get(key.as_str()).map(BoardRecord::open).transpose()
    }

    fn exists(&self, key: &BoardKey) -> bool {
        self.boards
            .read()
            .map(|boards| boards.contains_key(key.as_str()))
            .unwrap_or(false)
    }

    fn delete(&self, key: &BoardKey) -> Result<()> {
        let mut boards = self
            .boards
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        boards.remove(key.as_str());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let boards = self
            .boards
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut keys: Vec<String> = boards.keys().cloned().collect();
        keys.sort_unstable();
        Ok(keys)
    }
}
