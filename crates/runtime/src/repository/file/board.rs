//! File-based BoardRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use scout_core::ProbabilityGrid;

use crate::repository::{BoardKey, BoardRecord, BoardRepository, RepositoryError, Result};
use crate::utils::hash::short_digest;

/// File-based implementation of BoardRepository.
///
/// Stores boards as individual bincode files indexed by key.
///
/// # File Format
///
/// Boards are stored as `board_{key}.bin`, each holding one bincode
/// [`BoardRecord`]. Writes go to a temporary file that is renamed into place.
pub struct FileBoardRepository {
    base_dir: PathBuf,
}

impl FileBoardRepository {
    /// Create a new file-based board repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a board file.
    fn board_path(&self, key: &BoardKey) -> PathBuf {
        self.base_dir.join(format!("board_{}.bin", key))
    }
}

impl BoardRepository for FileBoardRepository {
    fn save(&self, key: &BoardKey, grid: &ProbabilityGrid) -> Result<()> {
        let path = self.board_path(key);
        let temp_path = path.with_extension("bin.tmp");

        let record = BoardRecord::seal(grid)?;
        let bytes = bincode::serialize(&record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        // Write to temp file
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(
            "Saved board[{}] ({}) to {}",
            key,
            short_digest(&record.digest),
            path.display()
        );

        Ok(())
    }

    fn load(&self, key: &BoardKey) -> Result<Option<ProbabilityGrid>> {
        let path = self.board_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        let record: BoardRecord = bincode::deserialize(&bytes).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;
        let grid = record.open()?;

        tracing::debug!(
            "Loaded board[{}] ({}) from {}",
            key,
            short_digest(&record.digest),
            path.display()
        );

        Ok(Some(grid))
    }

    fn exists(&self, key: &BoardKey) -> bool {
        self.board_path(key).exists()
    }

    fn delete(&self, key: &BoardKey) -> Result<()> {
        let path = self.board_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted board[{}]", key);
        }

        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(key) = filename
                    .strip_prefix("board_")
                    .and_then(|s| s.strip_suffix(".bin"))
            {
                keys.push(key.to_string());
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}
