//! Episode lifecycle: load the prior board, track one run, persist the result.
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use scout_core::{
    BeliefTracker, DrawScope, MapDimensions, Position, ProbabilityGrid, RngOracle, ScoutConfig,
    StepDecision, StepRequest, Tick, TickOutcome, UnitId, UnitReport, VisionOracle, WorldOracle,
};

use crate::api::Result;
use crate::repository::{BoardKey, BoardRepository, FileBoardRepository, RepositoryError};

/// Settings for a [`Runtime`].
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub scout: ScoutConfig,
    /// Load and save boards across episodes.
    pub persistent: bool,
    /// Where boards are stored; platform data directory when unset.
    pub save_dir: Option<PathBuf>,
    /// Base seed for every random draw of an episode.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scout: ScoutConfig::default(),
            persistent: false,
            save_dir: None,
            seed: Self::DEFAULT_SEED,
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_SEED: u64 = 0x5eed;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SCOUT_PERSISTENT` - Load/save boards between episodes (default: false)
    /// - `SCOUT_SAVE_DIR` - Directory for saved boards (default: platform-specific)
    /// - `SCOUT_SEED` - Episode seed (default: [`Self::DEFAULT_SEED`])
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("SCOUT_PERSISTENT") {
            match parse_flag(&value) {
                Some(enable) => config.persistent = enable,
                None => tracing::warn!("Ignoring SCOUT_PERSISTENT={:?}", value),
            }
        }

        config.save_dir = lookup("SCOUT_SAVE_DIR").map(PathBuf::from);

        if let Some(seed) = lookup("SCOUT_SEED").and_then(|v| v.parse().ok()) {
            config.seed = seed;
        }

        config
    }

    /// Configured save directory, or the platform data directory.
    ///
    /// - Linux: `~/.local/share/tower-scout/boards`
    /// - macOS: `~/Library/Application Support/tower-scout/boards`
    /// - Fallback: `./save_data/boards`
    pub fn resolved_save_dir(&self) -> PathBuf {
        self.save_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "tower-scout")
                .map(|dirs| dirs.data_dir().join("boards"))
                .unwrap_or_else(|| PathBuf::from("./save_data/boards"))
        })
    }
}

/// Boolean switch; a variable set without a value counts as on.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Starts and finishes episodes against an optional board repository.
pub struct Runtime {
    config: RuntimeConfig,
    repository: Option<Arc<dyn BoardRepository>>,
}

impl Runtime {
    /// Builds a runtime; opens the file repository when persistence is on.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let repository: Option<Arc<dyn BoardRepository>> = if config.persistent {
            let dir = config.resolved_save_dir();
            tracing::info!("Board persistence enabled: {}", dir.display());
            Some(Arc::new(FileBoardRepository::new(dir)?))
        } else {
            None
        };

        Ok(Self { config, repository })
    }

    /// Builds a runtime around an existing repository.
    pub fn with_repository(config: RuntimeConfig, repository: Arc<dyn BoardRepository>) -> Self {
        Self {
            config,
            repository: Some(repository),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Replaces the seed used by episodes started from now on.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    /// Starts an episode, seeding the belief from a stored board when one
    /// matches the board size and starting units.
    ///
    /// A stored board that fails verification or has other dimensions is
    /// ignored and the episode starts fresh.
    pub fn start_episode(
        &self,
        dimensions: MapDimensions,
        units: &[(UnitId, Position)],
    ) -> Result<Episode> {
        let key = BoardKey::new(dimensions, units.iter().copied());
        let scout = self.config.scout.clone();

        let stored = match &self.repository {
            Some(repository) => match repository.load(&key) {
                Ok(grid) => grid,
                Err(RepositoryError::CorruptedData(reason)) => {
                    tracing::warn!("Ignoring corrupted board[{}]: {}", key, reason);
                    None
                }
                Err(error) => return Err(error.into()),
            },
            None => None,
        };

        let mut resumed = false;
        let tracker = match stored {
            Some(grid) if grid.dimensions() == dimensions => {
                tracing::info!("Resuming board[{}] from a previous episode", key);
                resumed = true;
                BeliefTracker::from_grid(grid, scout)
            }
            Some(grid) => {
                tracing::warn!(
                    "Ignoring board[{}] with size {}x{}",
                    key,
                    grid.width(),
                    grid.height()
                );
                BeliefTracker::new(dimensions, scout)
            }
            None => {
                tracing::info!("Starting fresh board[{}]", key);
                BeliefTracker::new(dimensions, scout)
            }
        };

        Ok(Episode {
            key,
            tracker,
            tick: Tick::ZERO,
            seed: self.config.seed,
            resumed,
            hits: 0,
        })
    }

    /// Persists the episode's board (when persistence is on) and returns it.
    pub fn finish_episode(&self, episode: Episode) -> Result<ProbabilityGrid> {
        let Episode {
            key, tracker, tick, hits, ..
        } = episode;
        let grid = tracker.into_grid();

        tracing::info!(
            "Episode on board[{}] finished after {} ticks with {} hits",
            key,
            tick,
            hits
        );

        if let Some(repository) = &self.repository {
            repository.save(&key, &grid)?;
            tracing::info!("Saved board[{}]", key);
        }

        Ok(grid)
    }
}

/// One run of the agent over a board.
pub struct Episode {
    key: BoardKey,
    tracker: BeliefTracker,
    tick: Tick,
    seed: u64,
    resumed: bool,
    hits: u64,
}

impl Episode {
    pub fn key(&self) -> &BoardKey {
        &self.key
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn tracker(&self) -> &BeliefTracker {
        &self.tracker
    }

    pub fn grid(&self) -> &ProbabilityGrid {
        self.tracker.grid()
    }

    /// Whether the belief was seeded from a stored board.
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total hits observed so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Feeds this tick's unit reports into the belief.
    pub fn observe<V: VisionOracle>(
        &mut self,
        units: &[UnitReport],
        vision: &V,
    ) -> Result<TickOutcome> {
        let was_exploring = self.tracker.is_exploring();
        let outcome = self.tracker.ingest(units, vision)?;

        for tower in &outcome.revealed_towers {
            tracing::info!("Tower sighted at {} on tick {}", tower, self.tick);
        }
        for unit in &outcome.hit_units {
            tracing::info!("Unit {} has been hit on tick {}", unit, self.tick);
        }
        if !outcome.hit_units.is_empty() {
            self.hits += outcome.hit_units.len() as u64;
            tracing::debug!("Board after hit:\n{}", self.tracker.grid());
        }
        if was_exploring && !self.tracker.is_exploring() {
            tracing::info!("First hit taken; switching from exploration to planning");
        }

        Ok(outcome)
    }

    /// Chooses one unit's next move for the current tick.
    pub fn plan<W, R>(&self, request: &StepRequest, world: W, rng: &R) -> StepDecision
    where
        W: WorldOracle,
        R: RngOracle + ?Sized,
    {
        let scope = DrawScope::new(self.seed, self.tick);
        let decision = self.tracker.plan_step(request, world, rng, scope);

        match &decision {
            StepDecision::Blocked(error) => {
                tracing::debug!("Unit {} cannot move: {}", request.unit, error);
            }
            StepDecision::Detour(next) => {
                tracing::debug!("Unit {} detours to {}", request.unit, next);
            }
            _ => {}
        }

        decision
    }

    /// Forgets a unit that left the board.
    pub fn retire(&mut self, unit: UnitId) {
        self.tracker.forget(unit);
    }

    /// Moves to the next tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.next();
    }
}
