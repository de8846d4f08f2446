//! Scenario loader.
//!
//! A scenario is the ground truth of one simulated run: board size, where
//! the towers really are, terrain, the two structures units travel between,
//! and the starting units. Positions are `(x, y)` tuples in the RON file.

use std::collections::HashSet;
use std::path::Path;

use scout_core::{MapDimensions, Position, UnitId};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Scenario data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScenarioRon {
    name: String,
    dimensions: (u32, u32),
    town_hall: (i32, i32),
    gold_mine: (i32, i32),
    #[serde(default)]
    towers: Vec<(i32, i32)>,
    #[serde(default)]
    trees: Vec<(i32, i32)>,
    units: Vec<UnitRon>,
    #[serde(default = "default_tower_damage")]
    tower_damage: u32,
    #[serde(default = "default_max_ticks")]
    max_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitRon {
    id: u32,
    position: (i32, i32),
    health: u32,
}

fn default_tower_damage() -> u32 {
    Scenario::DEFAULT_TOWER_DAMAGE
}

fn default_max_ticks() -> u64 {
    Scenario::DEFAULT_MAX_TICKS
}

fn position((x, y): (i32, i32)) -> Position {
    Position::new(x, y)
}

/// Starting state of one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSpec {
    pub id: UnitId,
    pub position: Position,
    pub health: u32,
}

/// Validated scenario ready to drive a simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub dimensions: MapDimensions,
    pub town_hall: Position,
    pub gold_mine: Position,
    pub towers: Vec<Position>,
    pub trees: Vec<Position>,
    pub units: Vec<UnitSpec>,
    /// Health a unit loses per successful tower shot.
    pub tower_damage: u32,
    /// Tick limit after which the run is cut off.
    pub max_ticks: u64,
}

impl Scenario {
    pub const DEFAULT_TOWER_DAMAGE: u32 = 4;
    pub const DEFAULT_MAX_TICKS: u64 = 500;

    /// Ids and starting cells of all units.
    pub fn starting_positions(&self) -> impl Iterator<Item = (UnitId, Position)> + '_ {
        self.units.iter().map(|unit| (unit.id, unit.position))
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file.
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))
    }

    /// Parse and validate a scenario from RON text.
    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let data: ScenarioRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        let scenario = Scenario {
            name: data.name,
            dimensions: MapDimensions::new(data.dimensions.0, data.dimensions.1),
            town_hall: position(data.town_hall),
            gold_mine: position(data.gold_mine),
            towers: data.towers.into_iter().map(position).collect(),
            trees: data.trees.into_iter().map(position).collect(),
            units: data
                .units
                .into_iter()
                .map(|unit| UnitSpec {
                    id: UnitId(unit.id),
                    position: position(unit.position),
                    health: unit.health,
                })
                .collect(),
            tower_damage: data.tower_damage,
            max_ticks: data.max_ticks,
        };

        Self::validate(&scenario)?;
        Ok(scenario)
    }

    fn validate(scenario: &Scenario) -> LoadResult<()> {
        let dims = scenario.dimensions;
        if dims.area() == 0 {
            anyhow::bail!("scenario board must not be empty");
        }

        let landmarks = [("town hall", scenario.town_hall), ("gold mine", scenario.gold_mine)];
        let placed = landmarks
            .into_iter()
            .chain(scenario.towers.iter().map(|p| ("tower", *p)))
            .chain(scenario.trees.iter().map(|p| ("tree", *p)))
            .chain(scenario.units.iter().map(|u| ("unit", u.position)));

        let mut blocked = HashSet::new();
        for (what, at) in placed {
            if !dims.contains(at) {
                anyhow::bail!(
                    "{} at {} is outside the {}x{} board",
                    what,
                    at,
                    dims.width,
                    dims.height
                );
            }
            if what != "unit" && !blocked.insert(at) {
                anyhow::bail!("{} at {} overlaps another structure", what, at);
            }
        }

        let mut ids = HashSet::new();
        for unit in &scenario.units {
            if blocked.contains(&unit.position) {
                anyhow::bail!("unit {} starts on an occupied cell {}", unit.id, unit.position);
            }
            if !ids.insert(unit.id) {
                anyhow::bail!("duplicate unit id {}", unit.id);
            }
            if unit.health == 0 {
                anyhow::bail!("unit {} starts with no health", unit.id);
            }
        }

        Ok(())
    }
}
