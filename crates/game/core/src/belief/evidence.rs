use crate::belief::WeaponProfile;
use crate::state::{GridError, Position, ProbabilityGrid};

/// Outcome of a single [`BayesianUpdater::apply_evidence`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvidenceSummary {
    /// Cells whose posterior was written back.
    pub revised: usize,
    /// Candidate cells left at their prior because both Bayes terms were zero.
    pub degenerate: usize,
}

/// Revises unseen cells from a hit / no-hit observation.
///
/// Every candidate tower cell is treated as an independent Bernoulli event.
/// The rule is an approximation: it is kept exactly as below because the
/// planner's behaviour is tuned against it.
///
/// For an observation at `(x, y)` the window is the half-open box
/// `[x-R, x+R) x [y-R, y+R)` clipped to the grid. Window cells that are seen,
/// or that lie within range of `(x, y)`, keep their value. For each remaining
/// cell with prior `P(T)`:
///
/// ```text
/// P(S|N) = prod over the other window cells of (1 - q) + q (1 - accuracy)
/// hit:   P(H|N) = 1 - P(S|N)    P(H|T) = 1 - (1 - P(H|N)) (1 - accuracy)
/// miss:  P(H|N) = P(S|N)        P(H|T) = P(H|N) (1 - accuracy)
/// P(T|e) = P(H|T) P(T) / (P(H|T) P(T) + P(H|N) (1 - P(T)))
/// ```
///
/// All `q` and priors come from one snapshot taken before any write.
#[derive(Clone, Copy, Debug)]
pub struct BayesianUpdater {
    weapon: WeaponProfile,
}

impl BayesianUpdater {
    pub fn new(weapon: WeaponProfile) -> Self {
        Self { weapon }
    }

    /// Applies one observation made by a unit standing at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `position` is outside the grid;
    /// the grid is left untouched in that case.
    pub fn apply_evidence(
        &self,
        grid: &mut ProbabilityGrid,
        position: Position,
        was_hit: bool,
    ) -> Result<EvidenceSummary, GridError> {
        grid.cell(position)?;

        let snapshot = grid.snapshot();
        let window = self.window(grid, position);
        let priors: Vec<f32> = window
            .iter()
            .map(|cell| snapshot.get(*cell).unwrap_or(0.0))
            .collect();

        let miss = 1.0 - self.weapon.accuracy;
        let mut summary = EvidenceSummary::default();

        for (index, &cell) in window.iter().enumerate() {
            if grid.is_seen(cell)? || self.weapon.within_range(position, cell) {
                continue;
            }

            let safe_given_empty = priors
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .fold(1.0_f32, |acc, (_, &q)| acc * ((1.0 - q) + q * miss));

            let (given_empty, given_tower) = if was_hit {
                let given_empty = 1.0 - safe_given_empty;
                (given_empty, 1.0 - (1.0 - given_empty) * miss)
            } else {
                (safe_given_empty, safe_given_empty * miss)
            };

            let prior = priors[index];
            let numerator = given_tower * prior;
            let denominator = numerator + given_empty * (1.0 - prior);
            if denominator <= 0.0 || !denominator.is_finite() {
                summary.degenerate += 1;
                continue;
            }

            grid.set_probability(cell, numerator / denominator)?;
            summary.revised += 1;
        }

        Ok(summary)
    }

    /// Half-open box around `position`, clipped to the grid, x-major order.
    fn window(&self, grid: &ProbabilityGrid, position: Position) -> Vec<Position> {
        let r = self.weapon.range as i32;
        let from_x = (position.x - r).max(0);
        let to_x = (position.x + r).min(grid.width() as i32);
        let from_y = (position.y - r).max(0);
        let to_y = (position.y + r).min(grid.height() as i32);

        (from_x..to_x)
            .flat_map(|x| (from_y..to_y).map(move |y| Position::new(x, y)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapDimensions;

    const WEAPON: WeaponProfile = WeaponProfile::new(4, 0.75);

    fn board() -> ProbabilityGrid {
        ProbabilityGrid::new(MapDimensions::new(16, 16), 0.01)
    }

    fn all_in_unit_interval(grid: &ProbabilityGrid) -> bool {
        grid.iter()
            .all(|(_, c)| (0.0..=1.0).contains(&c.tower_probability()))
    }

    #[test]
    fn hit_raises_and_miss_lowers_corner_cells() {
        let updater = BayesianUpdater::new(WEAPON);
        let at = Position::new(8, 8);
        // (4,4) is in the window but ~5.66 cells away
        let corner = Position::new(4, 4);

        let mut hit = board();
        let summary = updater.apply_evidence(&mut hit, at, true).unwrap();
        assert!(summary.revised > 0);
        assert!(hit.probability(corner).unwrap() > 0.01);

        let mut miss = board();
        updater.apply_evidence(&mut miss, at, false).unwrap();
        assert!(miss.probability(corner).unwrap() < 0.01);
    }

    #[test]
    fn cells_within_range_and_outside_window_are_untouched() {
        let updater = BayesianUpdater::new(WEAPON);
        let mut grid = board();
        let at = Position::new(8, 8);
        updater.apply_evidence(&mut grid, at, true).unwrap();

        assert_eq!(grid.probability(Position::new(8, 8)).unwrap(), 0.01);
        assert_eq!(grid.probability(Position::new(5, 6)).unwrap(), 0.01);
        // upper edge of the half-open window
        assert_eq!(grid.probability(Position::new(12, 12)).unwrap(), 0.01);
        assert_eq!(grid.probability(Position::new(0, 0)).unwrap(), 0.01);
    }

    #[test]
    fn seen_cells_are_ground_truth() {
        let updater = BayesianUpdater::new(WEAPON);
        let mut grid = board();
        let corner = Position::new(4, 4);
        grid.set_seen(corner, true).unwrap();
        grid.set_probability(corner, 0.0).unwrap();
        updater.apply_evidence(&mut grid, Position::new(8, 8), true).unwrap();
        assert_eq!(grid.probability(corner).unwrap(), 0.0);
    }

    #[test]
    fn posterior_matches_closed_form() {
        // 2x2 board, range 1: the window of (1,1) is the whole board and only
        // (0,0), ~1.41 away, is revised. P(S|N) cancels out of the ratio.
        let weapon = WeaponProfile::new(1, 0.75);
        let updater = BayesianUpdater::new(weapon);
        let mut grid = ProbabilityGrid::new(MapDimensions::new(2, 2), 0.2);
        updater.apply_evidence(&mut grid, Position::new(1, 1), false).unwrap();

        // P(S|T) = 0.25 P(S|N)  =>  0.25*0.2 / (0.25*0.2 + 0.8)
        let expected = 0.05 / 0.85;
        let got = grid.probability(Position::new(0, 0)).unwrap();
        assert!((got - expected).abs() < 1e-6, "{got} vs {expected}");
    }

    #[test]
    fn zero_denominator_keeps_prior() {
        // With every prior at 0, P(S|N) = 1 so a hit gives P(H|N) = 0, and
        // the zero prior zeroes the numerator too.
        let weapon = WeaponProfile::new(1, 0.75);
        let updater = BayesianUpdater::new(weapon);
        let mut grid = ProbabilityGrid::new(MapDimensions::new(2, 2), 0.0);
        let summary = updater.apply_evidence(&mut grid, Position::new(1, 1), true).unwrap();
        assert_eq!(summary.degenerate, 1);
        assert_eq!(summary.revised, 0);
        assert_eq!(grid.probability(Position::new(0, 0)).unwrap(), 0.0);
    }

    #[test]
    fn repeated_misses_never_raise_probabilities() {
        let updater = BayesianUpdater::new(WEAPON);
        let mut grid = board();
        grid.set_probability(Position::new(3, 5), 0.6).unwrap();
        let at = Position::new(7, 7);

        for _ in 0..10 {
            let before = grid.snapshot();
            updater.apply_evidence(&mut grid, at, false).unwrap();
            for position in grid.dimensions().positions() {
                let old = before.get(position).unwrap();
                let new = grid.probability(position).unwrap();
                assert!(new <= old, "{position}: {old} -> {new}");
            }
        }
        assert!(all_in_unit_interval(&grid));
    }

    #[test]
    fn probabilities_stay_in_unit_interval_under_mixed_evidence() {
        let updater = BayesianUpdater::new(WEAPON);
        let mut grid = board();
        grid.set_probability(Position::new(2, 2), 1.0).unwrap();
        grid.set_seen(Position::new(2, 2), true).unwrap();
        let spots = [(0, 0), (15, 15), (6, 6), (8, 3), (1, 14), (6, 6)];
        for (i, (x, y)) in spots.into_iter().enumerate() {
            updater
                .apply_evidence(&mut grid, Position::new(x, y), i % 2 == 0)
                .unwrap();
            assert!(all_in_unit_interval(&grid));
        }
    }

    #[test]
    fn out_of_bounds_observation_is_rejected() {
        let updater = BayesianUpdater::new(WEAPON);
        let mut grid = board();
        let before = grid.clone();
        assert!(updater.apply_evidence(&mut grid, Position::new(16, 0), true).is_err());
        assert_eq!(grid, before);
    }
}
