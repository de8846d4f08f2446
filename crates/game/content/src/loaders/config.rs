//! Agent configuration loader.

use std::path::Path;

use scout_core::ScoutConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`ScoutConfig`] from TOML files.
///
/// Missing keys fall back to the defaults, so an empty file is valid.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<ScoutConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config from TOML text.
    pub fn parse(content: &str) -> LoadResult<ScoutConfig> {
        let config: ScoutConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &ScoutConfig) -> LoadResult<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&config.tower_accuracy) {
            anyhow::bail!("tower_accuracy must be within [0, 1], got {}", config.tower_accuracy);
        }
        if !unit.contains(&config.initial_tower_density) {
            anyhow::bail!(
                "initial_tower_density must be within [0, 1], got {}",
                config.initial_tower_density
            );
        }
        if !(0.0..=1.0).contains(&config.random_walk_probability) {
            anyhow::bail!(
                "random_walk_probability must be within [0, 1], got {}",
                config.random_walk_probability
            );
        }
        if config.min_step_risk.is_nan() || config.min_step_risk < 0.0 {
            anyhow::bail!("min_step_risk must be non-negative, got {}", config.min_step_risk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(ConfigLoader::parse("").unwrap(), ScoutConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let config = ConfigLoader::parse("tower_range = 6\nvision_range = 3\n").unwrap();
        assert_eq!(config.tower_range, 6);
        assert_eq!(config.vision_range, 3);
        assert_eq!(config.tower_accuracy, ScoutConfig::DEFAULT_TOWER_ACCURACY);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let err = ConfigLoader::parse("tower_accuracy = 1.5").unwrap_err();
        assert!(err.to_string().contains("tower_accuracy"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.toml");
        std::fs::write(&path, "random_walk_probability = 0.5\n").unwrap();
        assert_eq!(ConfigLoader::load(&path).unwrap().random_walk_probability, 0.5);
        assert!(ConfigLoader::load(&dir.path().join("missing.toml")).is_err());
    }
}
