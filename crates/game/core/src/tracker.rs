//! Per-episode belief tracking and step selection.
//!
//! [`BeliefTracker`] owns the episode's [`ProbabilityGrid`]. Each tick the host
//! reports every friendly unit through [`BeliefTracker::ingest`]; once evidence
//! is in, [`BeliefTracker::plan_step`] chooses each unit's next cell.
use std::collections::HashMap;

use crate::belief::{BayesianUpdater, EvidenceSummary, record_sighting};
use crate::config::ScoutConfig;
use crate::env::{
    DrawContext, MapDimensions, RngOracle, VisionOracle, WorldOracle, compute_seed,
};
use crate::movement::Direction;
use crate::search::{PathError, RiskAwareSearch};
use crate::state::{GridError, Position, ProbabilityGrid, Tick, UnitId};

/// State of one friendly unit as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitReport {
    pub id: UnitId,
    pub position: Position,
    pub health: u32,
}

impl UnitReport {
    pub fn new(id: UnitId, position: Position, health: u32) -> Self {
        Self {
            id,
            position,
            health,
        }
    }
}

/// What one call to [`BeliefTracker::ingest`] learned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Units that lost health since their previous report, in report order.
    pub hit_units: Vec<UnitId>,
    /// Cells first confirmed as towers this tick.
    pub revealed_towers: Vec<Position>,
    /// Evidence bookkeeping summed over all units.
    pub evidence: EvidenceSummary,
}

impl TickOutcome {
    pub fn was_hit(&self, unit: UnitId) -> bool {
        self.hit_units.contains(&unit)
    }
}

/// Seed scope for the random draws of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawScope {
    pub episode_seed: u64,
    pub tick: Tick,
}

impl DrawScope {
    pub fn new(episode_seed: u64, tick: Tick) -> Self {
        Self { episode_seed, tick }
    }

    pub fn seed(&self, unit: UnitId, context: DrawContext) -> u64 {
        compute_seed(self.episode_seed, self.tick.0, unit.0, context)
    }
}

/// Movement request for one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepRequest {
    pub unit: UnitId,
    pub origin: Position,
    pub goal: Position,
    /// Whether the unit was hit during the tick that was just ingested.
    pub was_hit: bool,
}

/// Next move chosen for a unit.
#[derive(Clone, Debug, PartialEq)]
pub enum StepDecision {
    /// Exploration step taken before any unit has been hit.
    Explore(Position),
    /// First step of the lowest-risk path.
    Follow(Position),
    /// Random step taken instead of the planned one after a hit.
    Detour(Position),
    /// The unit already stands on its goal.
    Arrived,
    /// No passable neighbour to explore.
    Hold,
    /// The planner found no route under the current belief.
    Blocked(PathError),
}

impl StepDecision {
    /// Cell the unit moves to, if it moves at all.
    pub fn destination(&self) -> Option<Position> {
        match self {
            StepDecision::Explore(p) | StepDecision::Follow(p) | StepDecision::Detour(p) => {
                Some(*p)
            }
            StepDecision::Arrived | StepDecision::Hold | StepDecision::Blocked(_) => None,
        }
    }

    pub fn direction_from(&self, origin: Position) -> Option<Direction> {
        self.destination()
            .and_then(|next| Direction::between(origin, next))
    }
}

/// Owns the belief grid of one episode and the per-unit health memory.
#[derive(Clone, Debug)]
pub struct BeliefTracker {
    grid: ProbabilityGrid,
    config: ScoutConfig,
    health: HashMap<UnitId, u32>,
    exploring: bool,
}

impl BeliefTracker {
    /// Fresh board with the configured uniform prior. Starts in exploration.
    pub fn new(dimensions: MapDimensions, config: ScoutConfig) -> Self {
        let grid = ProbabilityGrid::new(dimensions, config.initial_tower_density);
        Self {
            grid,
            config,
            health: HashMap::new(),
            exploring: true,
        }
    }

    /// Resumes from a board learned in an earlier episode. Exploration is
    /// skipped since the prior already carries information.
    pub fn from_grid(grid: ProbabilityGrid, config: ScoutConfig) -> Self {
        Self {
            grid,
            config,
            health: HashMap::new(),
            exploring: false,
        }
    }

    pub fn grid(&self) -> &ProbabilityGrid {
        &self.grid
    }

    pub fn into_grid(self) -> ProbabilityGrid {
        self.grid
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// True until the first hit of a fresh episode.
    pub fn is_exploring(&self) -> bool {
        self.exploring
    }

    pub fn last_health(&self, unit: UnitId) -> Option<u32> {
        self.health.get(&unit).copied()
    }

    /// Drops a unit that left the game so a recycled id starts clean.
    pub fn forget(&mut self, unit: UnitId) {
        self.health.remove(&unit);
    }

    /// Writes everything visible from `center` into the grid.
    ///
    /// The window is the square of half-width `vision_range`; cells off the
    /// board are skipped. Returns the towers this sweep revealed.
    pub fn observe_vision<V: VisionOracle>(
        &mut self,
        center: Position,
        vision: &V,
    ) -> Result<Vec<Position>, GridError> {
        let reach = self.config.vision_range as i32;
        let mut revealed = Vec::new();

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let Some(cell) = center.checked_offset(dx, dy) else {
                    continue;
                };
                if !self.grid.contains(cell) {
                    continue;
                }
                if record_sighting(&mut self.grid, cell, vision.sighting(cell))? {
                    revealed.push(cell);
                }
            }
        }

        Ok(revealed)
    }

    /// Folds one tick of unit reports into the belief.
    ///
    /// Units are processed in report order. For each unit: vision sweep,
    /// visit count, then hit or miss evidence at its cell. A unit reported
    /// for the first time has no health history and counts as not hit.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if a unit is reported off the
    /// board. Units earlier in the report have already been applied.
    pub fn ingest<V: VisionOracle>(
        &mut self,
        units: &[UnitReport],
        vision: &V,
    ) -> Result<TickOutcome, GridError> {
        let updater = BayesianUpdater::new(self.config.weapon());
        let mut outcome = TickOutcome::default();

        for unit in units {
            self.grid.cell(unit.position)?;

            let revealed = self.observe_vision(unit.position, vision)?;
            outcome.revealed_towers.extend(revealed);
            self.grid.increment_visit(unit.position)?;

            let previous = *self.health.entry(unit.id).or_insert(unit.health);
            let was_hit = previous > unit.health;
            if was_hit {
                self.grid.increment_hits(unit.position)?;
                self.exploring = false;
                outcome.hit_units.push(unit.id);
            }

            let summary = updater.apply_evidence(&mut self.grid, unit.position, was_hit)?;
            outcome.evidence.revised += summary.revised;
            outcome.evidence.degenerate += summary.degenerate;

            self.health.insert(unit.id, unit.health);
        }

        Ok(outcome)
    }

    /// Planner over the current belief.
    pub fn planner<W: WorldOracle>(&self, world: W) -> RiskAwareSearch<'_, W> {
        RiskAwareSearch::new(
            &self.grid,
            self.config.weapon(),
            self.config.min_step_risk,
            world,
        )
    }

    /// Chooses the next cell for one unit.
    ///
    /// While exploring, every unit takes a random passable step. Afterwards
    /// units follow the lowest-risk path, except that a unit hit this tick
    /// abandons the planned step for a random one with probability
    /// `random_walk_probability`.
    pub fn plan_step<W, R>(
        &self,
        request: &StepRequest,
        world: W,
        rng: &R,
        scope: DrawScope,
    ) -> StepDecision
    where
        W: WorldOracle,
        R: RngOracle + ?Sized,
    {
        if request.origin == request.goal {
            return StepDecision::Arrived;
        }

        let planner = self.planner(world);
        let random_neighbour = || {
            let options = planner.passable_neighbours(request.origin, request.goal);
            if options.is_empty() {
                return None;
            }
            let seed = scope.seed(request.unit, DrawContext::Neighbour);
            Some(options[rng.pick_index(seed, options.len())])
        };

        if self.exploring {
            return match random_neighbour() {
                Some(next) => StepDecision::Explore(next),
                None => StepDecision::Hold,
            };
        }

        let next = match planner.find_path(request.origin, request.goal) {
            Ok(path) => match path.first_step() {
                Some(next) => next,
                None => return StepDecision::Arrived,
            },
            Err(error) => return StepDecision::Blocked(error),
        };

        if request.was_hit {
            let seed = scope.seed(request.unit, DrawContext::Detour);
            if rng.chance(seed, self.config.random_walk_probability)
                && let Some(detour) = random_neighbour()
            {
                return StepDecision::Detour(detour);
            }
        }

        StepDecision::Follow(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::Sighting;
    use crate::env::{OpenField, PcgRng};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Scenery(HashMap<Position, Sighting>);

    impl VisionOracle for Scenery {
        fn sighting(&self, position: Position) -> Sighting {
            self.0.get(&position).copied().unwrap_or(Sighting::Empty)
        }
    }

    /// Always returns the same value, so `chance` succeeds for p > 0.
    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    const SCOPE: DrawScope = DrawScope {
        episode_seed: 7,
        tick: Tick(3),
    };

    fn config() -> ScoutConfig {
        ScoutConfig {
            vision_range: 1,
            ..ScoutConfig::default()
        }
    }

    fn tracker() -> BeliefTracker {
        BeliefTracker::new(MapDimensions::new(16, 16), config())
    }

    #[test]
    fn first_report_counts_as_miss() {
        let mut tracker = tracker();
        let at = Position::new(8, 8);
        let outcome = tracker
            .ingest(&[UnitReport::new(UnitId(1), at, 10)], &Scenery::default())
            .unwrap();

        assert!(outcome.hit_units.is_empty());
        assert!(outcome.evidence.revised > 0);
        assert!(tracker.grid().probability(Position::new(4, 4)).unwrap() < 0.01);
        assert_eq!(tracker.grid().cell(at).unwrap().visit_count(), 1);
        assert_eq!(tracker.last_health(UnitId(1)), Some(10));
        assert!(tracker.is_exploring());
    }

    #[test]
    fn health_loss_is_a_hit() {
        let mut tracker = tracker();
        let at = Position::new(8, 8);
        let vision = Scenery::default();
        tracker
            .ingest(&[UnitReport::new(UnitId(1), at, 10)], &vision)
            .unwrap();
        let outcome = tracker
            .ingest(&[UnitReport::new(UnitId(1), at, 7)], &vision)
            .unwrap();

        assert!(outcome.was_hit(UnitId(1)));
        assert!(!tracker.is_exploring());
        assert_eq!(tracker.grid().cell(at).unwrap().hit_count(), 1);
        assert_eq!(tracker.grid().cell(at).unwrap().visit_count(), 2);
    }

    #[test]
    fn forgotten_unit_starts_a_new_health_history() {
        let mut tracker = tracker();
        let at = Position::new(8, 8);
        let vision = Scenery::default();
        tracker
            .ingest(&[UnitReport::new(UnitId(4), at, 10)], &vision)
            .unwrap();
        tracker.forget(UnitId(4));
        assert_eq!(tracker.last_health(UnitId(4)), None);

        let outcome = tracker
            .ingest(&[UnitReport::new(UnitId(4), at, 3)], &vision)
            .unwrap();
        assert!(outcome.hit_units.is_empty());
        assert!(tracker.is_exploring());
    }

    #[test]
    fn vision_reveals_towers_once() {
        let mut tracker = tracker();
        let tower = Position::new(3, 4);
        let vision = Scenery(HashMap::from([
            (tower, Sighting::Tower),
            (Position::new(2, 2), Sighting::Tree),
        ]));
        let units = [UnitReport::new(UnitId(1), Position::new(3, 3), 5)];

        let first = tracker.ingest(&units, &vision).unwrap();
        assert_eq!(first.revealed_towers, vec![tower]);
        assert!(tracker.grid().has_obstacle(Position::new(2, 2)).unwrap());
        assert!(tracker.grid().is_seen(Position::new(4, 4)).unwrap());
        assert!(!tracker.grid().is_seen(Position::new(5, 5)).unwrap());

        let second = tracker.ingest(&units, &vision).unwrap();
        assert!(second.revealed_towers.is_empty());
    }

    #[test]
    fn vision_sweep_skips_cells_off_the_board() {
        let mut tracker = tracker();
        let revealed = tracker
            .observe_vision(Position::ORIGIN, &Scenery::default())
            .unwrap();
        assert!(revealed.is_empty());
        assert!(tracker.grid().is_seen(Position::new(1, 1)).unwrap());
    }

    #[test]
    fn vision_sweep_far_off_the_board_sees_nothing() {
        let mut tracker = tracker();
        let revealed = tracker
            .observe_vision(Position::new(i32::MAX, i32::MIN), &Scenery::default())
            .unwrap();
        assert!(revealed.is_empty());
        assert!(tracker.grid().iter().all(|(_, cell)| !cell.is_seen()));
    }

    #[test]
    fn off_board_report_is_rejected() {
        let mut tracker = tracker();
        let result = tracker.ingest(
            &[UnitReport::new(UnitId(1), Position::new(-1, 0), 5)],
            &Scenery::default(),
        );
        assert!(matches!(result, Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn exploration_takes_a_passable_random_step() {
        let tracker = tracker();
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::new(0, 0),
            goal: Position::new(10, 10),
            was_hit: false,
        };
        let decision = tracker.plan_step(&request, OpenField, &PcgRng, SCOPE);
        let StepDecision::Explore(next) = decision else {
            panic!("expected exploration, got {decision:?}");
        };
        assert!(request.origin.is_adjacent(next));
        assert!(tracker.grid().contains(next));
        assert_eq!(decision, tracker.plan_step(&request, OpenField, &PcgRng, SCOPE));
    }

    #[test]
    fn loaded_board_follows_the_planner() {
        let grid = ProbabilityGrid::new(MapDimensions::new(8, 8), 0.0);
        let tracker = BeliefTracker::from_grid(grid, config());
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::new(0, 0),
            goal: Position::new(4, 4),
            was_hit: false,
        };
        let decision = tracker.plan_step(&request, OpenField, &PcgRng, SCOPE);
        assert_eq!(decision, StepDecision::Follow(Position::new(1, 1)));
        assert_eq!(
            decision.direction_from(request.origin),
            Some(Direction::SouthEast)
        );
    }

    #[test]
    fn hit_unit_detours_when_the_draw_succeeds() {
        let grid = ProbabilityGrid::new(MapDimensions::new(8, 8), 0.0);
        let tracker = BeliefTracker::from_grid(grid, config());
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::new(3, 3),
            goal: Position::new(7, 7),
            was_hit: true,
        };
        // Draw 0 -> unit value 0.0 < 0.75, and index 0 picks the first neighbour.
        let decision = tracker.plan_step(&request, OpenField, &FixedRng(0), SCOPE);
        assert_eq!(decision, StepDecision::Detour(Position::new(2, 2)));

        let unhit = StepRequest {
            was_hit: false,
            ..request
        };
        let decision = tracker.plan_step(&unhit, OpenField, &FixedRng(0), SCOPE);
        assert_eq!(decision, StepDecision::Follow(Position::new(4, 4)));
    }

    #[test]
    fn failed_detour_draw_keeps_the_plan() {
        let grid = ProbabilityGrid::new(MapDimensions::new(8, 8), 0.0);
        let tracker = BeliefTracker::from_grid(grid, config());
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::new(3, 3),
            goal: Position::new(7, 7),
            was_hit: true,
        };
        let decision = tracker.plan_step(&request, OpenField, &FixedRng(u32::MAX), SCOPE);
        assert_eq!(decision, StepDecision::Follow(Position::new(4, 4)));
    }

    #[test]
    fn unit_on_goal_has_arrived() {
        let tracker = tracker();
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::new(2, 2),
            goal: Position::new(2, 2),
            was_hit: false,
        };
        assert_eq!(
            tracker.plan_step(&request, OpenField, &PcgRng, SCOPE),
            StepDecision::Arrived
        );
    }

    #[test]
    fn walled_in_goal_is_blocked() {
        let mut grid = ProbabilityGrid::new(MapDimensions::new(5, 5), 0.0);
        for position in MapDimensions::new(5, 5).positions() {
            if position.chebyshev_distance(Position::new(4, 4)) == 1 {
                grid.set_obstacle(position, true).unwrap();
            }
        }
        let tracker = BeliefTracker::from_grid(grid, config());
        let request = StepRequest {
            unit: UnitId(1),
            origin: Position::ORIGIN,
            goal: Position::new(4, 4),
            was_hit: false,
        };
        let decision = tracker.plan_step(&request, OpenField, &PcgRng, SCOPE);
        assert!(matches!(decision, StepDecision::Blocked(PathError::Unreachable { .. })));
        assert_eq!(decision.destination(), None);
    }
}
