//! Simulated world: true tower positions, terrain and unit health.
use std::collections::HashSet;

use scout_content::Scenario;
use scout_core::{
    Direction, DrawContext, MapDimensions, Position, RngOracle, Sighting, Tick, UnitId, UnitReport,
    VisionOracle, WeaponProfile, WorldOracle, compute_seed,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitState {
    Active,
    /// Reached the goal and left the board.
    Arrived,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimUnit {
    pub id: UnitId,
    pub position: Position,
    pub health: u32,
    pub state: UnitState,
}

impl SimUnit {
    pub fn is_active(&self) -> bool {
        self.state == UnitState::Active
    }
}

/// Ground truth for one run of a scenario.
#[derive(Clone, Debug)]
pub struct SimWorld {
    dimensions: MapDimensions,
    town_hall: Position,
    gold_mine: Position,
    towers: Vec<Position>,
    trees: HashSet<Position>,
    units: Vec<SimUnit>,
    tower_damage: u32,
}

impl SimWorld {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            dimensions: scenario.dimensions,
            town_hall: scenario.town_hall,
            gold_mine: scenario.gold_mine,
            towers: scenario.towers.clone(),
            trees: scenario.trees.iter().copied().collect(),
            units: scenario
                .units
                .iter()
                .map(|spec| SimUnit {
                    id: spec.id,
                    position: spec.position,
                    health: spec.health,
                    state: UnitState::Active,
                })
                .collect(),
            tower_damage: scenario.tower_damage,
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    /// Cell every unit is heading for.
    pub fn goal(&self) -> Position {
        self.gold_mine
    }

    pub fn towers(&self) -> &[Position] {
        &self.towers
    }

    pub fn units(&self) -> &[SimUnit] {
        &self.units
    }

    pub fn count(&self, state: UnitState) -> usize {
        self.units.iter().filter(|u| u.state == state).count()
    }

    /// True once no unit is still on its way.
    pub fn is_settled(&self) -> bool {
        self.units.iter().all(|u| !u.is_active())
    }

    /// Reports for every unit still on the board, in scenario order.
    pub fn reports(&self) -> Vec<UnitReport> {
        self.units
            .iter()
            .filter(|u| u.is_active())
            .map(|u| UnitReport::new(u.id, u.position, u.health))
            .collect()
    }

    /// Blocker view for `unit`'s planning: every other active unit occupies
    /// its cell and the town hall is a rally point.
    pub fn occupancy(&self, unit: UnitId) -> Occupancy<'_> {
        Occupancy { world: self, unit }
    }

    /// Whether terrain and structures allow standing on `position`.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.dimensions.contains(position)
            && !self.trees.contains(&position)
            && !self.towers.contains(&position)
            && position != self.town_hall
    }

    fn occupied_by_other(&self, unit: UnitId, position: Position) -> bool {
        self.units
            .iter()
            .any(|u| u.id != unit && u.is_active() && u.position == position)
    }

    /// Moves a unit one step. Illegal moves leave it in place and return false.
    pub fn move_unit(&mut self, unit: UnitId, direction: Direction) -> bool {
        let goal = self.gold_mine;
        let Some(from) = self
            .units
            .iter()
            .find(|u| u.id == unit && u.is_active())
            .map(|u| u.position)
        else {
            return false;
        };

        let to = direction.apply(from);
        if !self.is_walkable(to) || self.occupied_by_other(unit, to) {
            return false;
        }

        if let Some(sim) = self.units.iter_mut().find(|u| u.id == unit) {
            sim.position = to;
            if to == goal {
                sim.state = UnitState::Arrived;
            }
        }
        true
    }

    /// Every tower fires once at every active unit in range.
    ///
    /// Returns the units that were damaged, in scenario order, and marks
    /// units at zero health dead.
    pub fn fire_towers<R: RngOracle + ?Sized>(
        &mut self,
        rng: &R,
        weapon: WeaponProfile,
        episode_seed: u64,
        tick: Tick,
    ) -> Vec<UnitId> {
        let mut damaged = Vec::new();

        for unit in self.units.iter_mut().filter(|u| u.state == UnitState::Active) {
            for (index, tower) in self.towers.iter().enumerate() {
                if !weapon.within_range(*tower, unit.position) {
                    continue;
                }
                let seed = compute_seed(
                    episode_seed.wrapping_add(index as u64),
                    tick.0,
                    unit.id.0,
                    DrawContext::World,
                );
                if rng.chance(seed, f64::from(weapon.accuracy)) {
                    unit.health = unit.health.saturating_sub(self.tower_damage);
                    if !damaged.contains(&unit.id) {
                        damaged.push(unit.id);
                    }
                }
            }
            if unit.health == 0 {
                unit.state = UnitState::Dead;
            }
        }

        damaged
    }
}

impl VisionOracle for SimWorld {
    fn sighting(&self, position: Position) -> Sighting {
        if self.towers.contains(&position) {
            Sighting::Tower
        } else if self.trees.contains(&position) {
            Sighting::Tree
        } else if position == self.gold_mine {
            Sighting::Resource
        } else if position == self.town_hall
            || self.units.iter().any(|u| u.is_active() && u.position == position)
        {
            Sighting::Structure
        } else {
            Sighting::Empty
        }
    }
}

/// Live blockers as seen by one unit.
#[derive(Clone, Copy, Debug)]
pub struct Occupancy<'w> {
    world: &'w SimWorld,
    unit: UnitId,
}

impl WorldOracle for Occupancy<'_> {
    fn is_occupied(&self, position: Position) -> bool {
        self.world.occupied_by_other(self.unit, position)
    }

    fn is_rally_point(&self, position: Position) -> bool {
        position == self.world.town_hall
    }
}
