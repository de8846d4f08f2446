//! Risk-weighted A* over the belief grid.
//!
//! Each cell costs the probability of being hit while standing on it, so the
//! search minimises cumulative exposure rather than step count. The heuristic
//! is the Chebyshev distance to the target scaled by the smallest per-step
//! risk: small next to real exposure, but enough to break ties toward the
//! target among equally risky candidates.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use arrayvec::ArrayVec;

use crate::belief::{RiskAggregator, WeaponProfile};
use crate::env::WorldOracle;
use crate::error::{CoreError, ErrorSeverity};
use crate::search::{NodeArena, NodeId};
use crate::state::{Position, ProbabilityGrid};

/// Neighbour offsets in expansion order (x-major).
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PathError {
    /// Open set emptied before the target was selected for expansion.
    #[error("target {target} is unreachable from {origin} ({expanded} nodes expanded)")]
    Unreachable {
        origin: Position,
        target: Position,
        expanded: usize,
    },

    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
}

impl CoreError for PathError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PathError::Unreachable { .. } => ErrorSeverity::Recoverable,
            PathError::OutOfBounds(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PathError::Unreachable { .. } => "PATH_UNREACHABLE",
            PathError::OutOfBounds(_) => "PATH_OUT_OF_BOUNDS",
        }
    }
}

/// Result of a successful search.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// From the first step after the origin through the target.
    /// Empty only when origin and target coincide.
    pub steps: Vec<Position>,
    /// Accumulated risk of the terminal node (origin included).
    pub total_risk: f32,
    /// Nodes taken off the open set.
    pub expanded: usize,
}

impl Path {
    pub fn first_step(&self) -> Option<Position> {
        self.steps.first().copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Open-set entry ordered for a min-heap on cost, then insertion sequence.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    cost: f32,
    sequence: u64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behaviour
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Risk-aware planner bound to one grid state and one world view.
pub struct RiskAwareSearch<'a, W: WorldOracle> {
    grid: &'a ProbabilityGrid,
    risk: RiskAggregator<'a>,
    world: W,
    min_step_risk: f32,
}

impl<'a, W: WorldOracle> RiskAwareSearch<'a, W> {
    pub fn new(
        grid: &'a ProbabilityGrid,
        weapon: WeaponProfile,
        min_step_risk: f32,
        world: W,
    ) -> Self {
        Self {
            grid,
            risk: RiskAggregator::new(grid, weapon),
            world,
            min_step_risk,
        }
    }

    /// Estimate of the risk still to be paid between `from` and `target`.
    pub fn heuristic(&self, from: Position, target: Position) -> f32 {
        from.chebyshev_distance(target) as f32 * self.min_step_risk
    }

    /// Cells a unit at `from` may step onto when heading for `target`.
    ///
    /// Excludes out-of-bounds cells, obstacles, occupied cells, certain
    /// towers, and rally points other than `target` itself.
    pub fn passable_neighbours(
        &self,
        from: Position,
        target: Position,
    ) -> ArrayVec<Position, 8> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(|&(dx, dy)| from.offset(dx, dy))
            .filter(|&cell| self.is_traversable(cell, target))
            .collect()
    }

    fn is_traversable(&self, cell: Position, target: Position) -> bool {
        let Ok(state) = self.grid.cell(cell) else {
            return false;
        };
        !(state.has_obstacle()
            || state.is_certain_tower()
            || self.world.is_occupied(cell)
            || (cell != target && self.world.is_rally_point(cell)))
    }

    /// Lowest cumulative-risk path from `origin` to `target`.
    ///
    /// # Errors
    ///
    /// - [`PathError::OutOfBounds`] if either endpoint is off the grid
    /// - [`PathError::Unreachable`] if no path exists under the current belief
    pub fn find_path(&self, origin: Position, target: Position) -> Result<Path, PathError> {
        for endpoint in [origin, target] {
            if !self.grid.contains(endpoint) {
                return Err(PathError::OutOfBounds(endpoint));
            }
        }

        let dimensions = self.grid.dimensions();
        let mut risk_cache: Vec<Option<f32>> = vec![None; dimensions.area()];
        let mut local_risk = |cell: Position| -> f32 {
            match dimensions.index_of(cell) {
                Some(index) => *risk_cache[index]
                    .get_or_insert_with(|| self.risk.hit_probability(cell)),
                None => self.risk.hit_probability(cell),
            }
        };

        let mut arena = NodeArena::with_capacity(dimensions.area());
        let mut closed = vec![false; dimensions.area()];
        let mut best_open: HashMap<Position, NodeId> = HashMap::new();
        let mut heap = BinaryHeap::new();
        let mut sequence = 0_u64;
        let mut expanded = 0_usize;

        let root = arena.push_origin(origin, local_risk(origin));
        best_open.insert(origin, root);
        heap.push(Frontier {
            cost: self.cost(&arena, root, target),
            sequence,
            node: root,
        });

        while let Some(Frontier { node: current, .. }) = heap.pop() {
            let position = arena[current].position();
            // stale entry superseded by a cheaper duplicate
            if best_open.get(&position) != Some(&current) {
                continue;
            }
            best_open.remove(&position);
            expanded += 1;

            if position == target {
                return Ok(Path {
                    steps: arena.path_to(current),
                    total_risk: arena[current].accumulated_cost(),
                    expanded,
                });
            }

            if let Some(index) = dimensions.index_of(position) {
                closed[index] = true;
            }

            for neighbour in self.passable_neighbours(position, target) {
                let is_closed = dimensions
                    .index_of(neighbour)
                    .is_some_and(|index| closed[index]);
                if is_closed {
                    continue;
                }

                let candidate_cost =
                    arena[current].accumulated_cost() + local_risk(neighbour);
                if let Some(&existing) = best_open.get(&neighbour)
                    && candidate_cost >= arena[existing].accumulated_cost()
                {
                    continue;
                }

                let child = arena.push_child(current, neighbour, local_risk(neighbour));
                best_open.insert(neighbour, child);
                sequence += 1;
                heap.push(Frontier {
                    cost: self.cost(&arena, child, target),
                    sequence,
                    node: child,
                });
            }
        }

        Err(PathError::Unreachable {
            origin,
            target,
            expanded,
        })
    }

    fn cost(&self, arena: &NodeArena, node: NodeId, target: Position) -> f32 {
        let node = &arena[node];
        self.heuristic(node.position(), target) + node.accumulated_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MapDimensions, OpenField};

    const WEAPON: WeaponProfile = WeaponProfile::new(4, 0.75);

    fn planner(grid: &ProbabilityGrid) -> RiskAwareSearch<'_, OpenField> {
        RiskAwareSearch::new(grid, WEAPON, 0.01, OpenField)
    }

    struct Blockers {
        occupied: Vec<Position>,
        rally: Vec<Position>,
    }

    impl WorldOracle for Blockers {
        fn is_occupied(&self, position: Position) -> bool {
            self.occupied.contains(&position)
        }

        fn is_rally_point(&self, position: Position) -> bool {
            self.rally.contains(&position)
        }
    }

    #[test]
    fn safe_board_yields_diagonal_path() {
        let grid = ProbabilityGrid::new(MapDimensions::new(8, 8), 0.0);
        let path = planner(&grid)
            .find_path(Position::new(0, 0), Position::new(4, 4))
            .unwrap();
        assert_eq!(
            path.steps,
            vec![
                Position::new(1, 1),
                Position::new(2, 2),
                Position::new(3, 3),
                Position::new(4, 4)
            ]
        );
        assert_eq!(path.first_step(), Some(Position::new(1, 1)));
        assert_eq!(path.total_risk, 0.0);
    }

    #[test]
    fn enclosed_target_is_unreachable() {
        let mut grid = ProbabilityGrid::new(MapDimensions::new(7, 7), 0.0);
        let target = Position::new(5, 5);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx != 0 || dy != 0 {
                    grid.set_obstacle(target.offset(dx, dy), true).unwrap();
                }
            }
        }
        let err = planner(&grid)
            .find_path(Position::new(0, 0), target)
            .unwrap_err();
        assert!(matches!(err, PathError::Unreachable { .. }));
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn prefers_lower_accumulated_risk_over_shorter_route() {
        // A known tower at (4,0) makes the straight row y=1 risky; the detour
        // through row 6 is longer but outside the tower's reach.
        let mut grid = ProbabilityGrid::new(MapDimensions::new(9, 8), 0.0);
        grid.set_probability(Position::new(4, 0), 1.0).unwrap();
        let search = planner(&grid);
        let path = search
            .find_path(Position::new(0, 1), Position::new(8, 1))
            .unwrap();

        let risk = RiskAggregator::new(&grid, WEAPON);
        let straight: f32 = (0..=8).map(|x| risk.hit_probability(Position::new(x, 1))).sum();
        assert!(path.total_risk < straight);
        assert!(path.steps.iter().any(|p| p.y >= 5));
        assert_eq!(path.steps.last(), Some(&Position::new(8, 1)));
    }

    #[test]
    fn lower_risk_branch_wins_between_equal_length_routes() {
        // (0,0) -> (2,0) takes two steps through either (1,0) or (1,1).
        // With range 0 a cell's risk is its own probability.
        let mut grid = ProbabilityGrid::new(MapDimensions::new(3, 2), 0.0);
        grid.set_probability(Position::new(1, 0), 0.5).unwrap();
        let weapon = WeaponProfile::new(0, 1.0);
        let search = RiskAwareSearch::new(&grid, weapon, 0.01, OpenField);
        let path = search
            .find_path(Position::new(0, 0), Position::new(2, 0))
            .unwrap();
        assert_eq!(path.steps, vec![Position::new(1, 1), Position::new(2, 0)]);
    }

    /// 4x5 board walled off except for two branches from `(0,3)` that rejoin
    /// at `(2,3)`: the upper one through `(1,2)`, the lower one through
    /// `(1,4)`. From `(2,3)` a single corridor leads to the target `(2,0)`.
    fn forked_corridor() -> ProbabilityGrid {
        let open = [
            Position::new(0, 3),
            Position::new(1, 2),
            Position::new(1, 4),
            Position::new(2, 3),
            Position::new(3, 2),
            Position::new(3, 1),
            Position::new(2, 0),
        ];
        let mut grid = ProbabilityGrid::new(MapDimensions::new(4, 5), 0.0);
        for position in grid.dimensions().positions().collect::<Vec<_>>() {
            if !open.contains(&position) {
                grid.set_obstacle(position, true).unwrap();
            }
        }
        grid
    }

    const FORK_TAIL: [Position; 4] = [
        Position::new(2, 3),
        Position::new(3, 2),
        Position::new(3, 1),
        Position::new(2, 0),
    ];

    #[test]
    fn cheaper_duplicate_replaces_an_earlier_open_entry() {
        // The upper branch is closer to the target, so it is expanded first
        // and queues (2,3) at cost 0.15. The lower branch is expanded next
        // and reaches (2,3) for free.
        let mut grid = forked_corridor();
        grid.set_probability(Position::new(1, 2), 0.15).unwrap();
        let search = RiskAwareSearch::new(&grid, WeaponProfile::new(0, 1.0), 0.1, OpenField);

        let path = search
            .find_path(Position::new(0, 3), Position::new(2, 0))
            .unwrap();

        let mut expected = vec![Position::new(1, 4)];
        expected.extend(FORK_TAIL);
        assert_eq!(path.steps, expected);
        assert_eq!(path.total_risk, 0.0);
    }

    #[test]
    fn equal_cost_duplicate_keeps_the_first_parent() {
        // Every cell is free and the heuristic is zero, so both branches
        // reach (2,3) at the same cost; the branch queued first owns it.
        let grid = forked_corridor();
        let search = RiskAwareSearch::new(&grid, WeaponProfile::new(0, 1.0), 0.0, OpenField);

        let path = search
            .find_path(Position::new(0, 3), Position::new(2, 0))
            .unwrap();

        let mut expected = vec![Position::new(1, 2)];
        expected.extend(FORK_TAIL);
        assert_eq!(path.steps, expected);
    }

    #[test]
    fn certain_towers_are_never_traversed() {
        let mut grid = ProbabilityGrid::new(MapDimensions::new(3, 1), 0.0);
        grid.set_probability(Position::new(1, 0), 1.0).unwrap();
        let err = planner(&grid)
            .find_path(Position::new(0, 0), Position::new(2, 0))
            .unwrap_err();
        assert!(matches!(err, PathError::Unreachable { .. }));
    }

    #[test]
    fn occupied_cells_and_rally_points_are_avoided_unless_target() {
        let grid = ProbabilityGrid::new(MapDimensions::new(3, 1), 0.0);
        let blocked = Blockers {
            occupied: vec![],
            rally: vec![Position::new(1, 0)],
        };
        let search = RiskAwareSearch::new(&grid, WEAPON, 0.01, &blocked);
        assert!(search.find_path(Position::new(0, 0), Position::new(2, 0)).is_err());
        let path = search
            .find_path(Position::new(0, 0), Position::new(1, 0))
            .unwrap();
        assert_eq!(path.steps, vec![Position::new(1, 0)]);

        let crowded = Blockers {
            occupied: vec![Position::new(1, 0)],
            rally: vec![],
        };
        let search = RiskAwareSearch::new(&grid, WEAPON, 0.01, &crowded);
        assert!(search.find_path(Position::new(0, 0), Position::new(2, 0)).is_err());
    }

    #[test]
    fn origin_equal_to_target_is_empty_success() {
        let grid = ProbabilityGrid::new(MapDimensions::new(3, 3), 0.0);
        let path = planner(&grid)
            .find_path(Position::new(1, 1), Position::new(1, 1))
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_are_rejected() {
        let grid = ProbabilityGrid::new(MapDimensions::new(3, 3), 0.0);
        let err = planner(&grid)
            .find_path(Position::new(0, 0), Position::new(3, 0))
            .unwrap_err();
        assert_eq!(err, PathError::OutOfBounds(Position::new(3, 0)));
    }

    #[test]
    fn search_is_deterministic() {
        let mut grid = ProbabilityGrid::new(MapDimensions::new(10, 10), 0.02);
        grid.set_obstacle(Position::new(3, 3), true).unwrap();
        let search = planner(&grid);
        let a = search.find_path(Position::new(0, 0), Position::new(9, 9)).unwrap();
        let b = search.find_path(Position::new(0, 0), Position::new(9, 9)).unwrap();
        assert_eq!(a, b);
    }
}
