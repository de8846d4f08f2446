use crate::state::{Position, ProbabilityGrid};

/// Firing characteristics shared by every tower on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponProfile {
    /// Circular range in cells (Euclidean).
    pub range: u32,
    /// Per-tick chance that a tower in range damages its target.
    pub accuracy: f32,
}

impl WeaponProfile {
    pub const fn new(range: u32, accuracy: f32) -> Self {
        Self { range, accuracy }
    }

    /// True when a tower at `tower` can reach `target`.
    pub fn within_range(&self, tower: Position, target: Position) -> bool {
        tower.euclidean_distance(target) <= f64::from(self.range)
    }

    /// In-bounds cells whose tower could fire at `target`.
    pub fn cells_in_range<'g>(
        &self,
        grid: &'g ProbabilityGrid,
        target: Position,
    ) -> impl Iterator<Item = Position> + 'g {
        let weapon = *self;
        let r = self.range as i32;
        (-r..=r)
            .flat_map(move |dx| (-r..=r).filter_map(move |dy| target.checked_offset(dx, dy)))
            .filter(move |cell| grid.contains(*cell) && weapon.within_range(*cell, target))
    }
}

/// Prices a cell by the chance that standing there gets a unit damaged.
#[derive(Clone, Copy, Debug)]
pub struct RiskAggregator<'g> {
    grid: &'g ProbabilityGrid,
    weapon: WeaponProfile,
}

impl<'g> RiskAggregator<'g> {
    pub fn new(grid: &'g ProbabilityGrid, weapon: WeaponProfile) -> Self {
        Self { grid, weapon }
    }

    pub fn weapon(&self) -> WeaponProfile {
        self.weapon
    }

    /// Probability that a unit at `position` is damaged this tick.
    ///
    /// Candidate tower cells are independent causes combined by noisy-OR
    /// (`p <- p + q - p*q`), then scaled by accuracy. Always in `[0, accuracy]`.
    pub fn hit_probability(&self, position: Position) -> f32 {
        let combined = self
            .weapon
            .cells_in_range(self.grid, position)
            .filter_map(|cell| self.grid.probability(cell).ok())
            .fold(0.0_f32, |p, q| p + q - p * q);
        combined.clamp(0.0, 1.0) * self.weapon.accuracy
    }
}
