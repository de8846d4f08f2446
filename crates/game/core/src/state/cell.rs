use bitflags::bitflags;

bitflags! {
    /// Observation flags carried by a [`Cell`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CellFlags: u8 {
        /// Some unit has had this cell inside its vision window.
        const SEEN     = 1 << 0;
        /// Terrain blocks movement (trees and similar). Not a tower.
        const OBSTACLE = 1 << 1;
    }
}

/// Belief about a single grid cell.
///
/// Once a cell is seen its probability is ground truth (0 or 1) and the
/// Bayesian update no longer touches it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    tower_probability: f32,
    flags: CellFlags,
    visit_count: u32,
    hit_count: u32,
}

impl Cell {
    /// Creates an unseen, unvisited cell with the given prior.
    ///
    /// The prior is clamped into `[0, 1]`; NaN is treated as 0.
    pub fn with_prior(prior: f32) -> Self {
        Self {
            tower_probability: clamp_probability(prior),
            flags: CellFlags::empty(),
            visit_count: 0,
            hit_count: 0,
        }
    }

    pub fn tower_probability(&self) -> f32 {
        self.tower_probability
    }

    pub fn is_seen(&self) -> bool {
        self.flags.contains(CellFlags::SEEN)
    }

    pub fn has_obstacle(&self) -> bool {
        self.flags.contains(CellFlags::OBSTACLE)
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    /// Number of ticks a unit standing here lost health.
    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn flags(&self) -> CellFlags {
        self.flags
    }

    /// A tower is known to stand here; the search never enters such a cell.
    pub fn is_certain_tower(&self) -> bool {
        self.tower_probability >= 1.0
    }

    pub(crate) fn set_tower_probability(&mut self, probability: f32) {
        self.tower_probability = clamp_probability(probability);
    }

    pub(crate) fn set_flag(&mut self, flag: CellFlags, value: bool) {
        self.flags.set(flag, value);
    }

    pub(crate) fn record_visit(&mut self) {
        self.visit_count = self.visit_count.saturating_add(1);
    }

    pub(crate) fn record_hit(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::with_prior(0.0)
    }
}

fn clamp_probability(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
