use crate::state::{GridError, Position, ProbabilityGrid};

/// What a unit saw on a cell inside its vision window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Sighting {
    /// Nothing on the cell.
    Empty,
    /// A resource that can be walked around but not through (a tree).
    Tree,
    /// Any other resource node, such as a gold mine.
    Resource,
    /// A hostile tower.
    Tower,
    /// A unit or structure that is not a tower.
    Structure,
}

impl Sighting {
    /// Ground-truth tower probability implied by this sighting.
    pub fn tower_probability(self) -> f32 {
        match self {
            Sighting::Tower => 1.0,
            Sighting::Empty | Sighting::Tree | Sighting::Resource | Sighting::Structure => 0.0,
        }
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, Sighting::Tree)
    }
}

/// Writes a direct observation: marks the cell seen and pins its probability.
///
/// Returns true when the sighting newly revealed a tower.
pub fn record_sighting(
    grid: &mut ProbabilityGrid,
    position: Position,
    sighting: Sighting,
) -> Result<bool, GridError> {
    let was_known_tower = grid.is_seen(position)? && grid.cell(position)?.is_certain_tower();

    grid.set_seen(position, true)?;
    grid.set_probability(position, sighting.tower_probability())?;
    if sighting.blocks_movement() {
        grid.set_obstacle(position, true)?;
    }

    Ok(sighting == Sighting::Tower && !was_known_tower)
}
