/// Tunable parameters for belief updates, risk pricing and movement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoutConfig {
    /// Circular firing radius of a tower, in cells.
    pub tower_range: u32,
    /// Chance that a tower in range damages a unit on a given tick.
    pub tower_accuracy: f32,
    /// Uniform prior tower probability for a fresh board.
    pub initial_tower_density: f32,
    /// Half-width of the square a unit can see around itself.
    pub vision_range: u32,
    /// Smallest risk a single step can cost; scales the search heuristic.
    pub min_step_risk: f32,
    /// Probability that a unit just hit deviates to a random neighbour.
    pub random_walk_probability: f64,
}

impl ScoutConfig {
    pub const DEFAULT_TOWER_RANGE: u32 = 4;
    pub const DEFAULT_TOWER_ACCURACY: f32 = 0.75;
    pub const DEFAULT_INITIAL_TOWER_DENSITY: f32 = 0.01;
    pub const DEFAULT_VISION_RANGE: u32 = 2;
    pub const DEFAULT_MIN_STEP_RISK: f32 = 0.01;
    pub const DEFAULT_RANDOM_WALK_PROBABILITY: f64 = 0.75;

    pub fn new() -> Self {
        Self {
            tower_range: Self::DEFAULT_TOWER_RANGE,
            tower_accuracy: Self::DEFAULT_TOWER_ACCURACY,
            initial_tower_density: Self::DEFAULT_INITIAL_TOWER_DENSITY,
            vision_range: Self::DEFAULT_VISION_RANGE,
            min_step_risk: Self::DEFAULT_MIN_STEP_RISK,
            random_walk_probability: Self::DEFAULT_RANDOM_WALK_PROBABILITY,
        }
    }

    pub fn weapon(&self) -> crate::belief::WeaponProfile {
        crate::belief::WeaponProfile::new(self.tower_range, self.tower_accuracy)
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::new()
    }
}
