//! Ground-truth simulation of a scenario.
mod runner;
mod summary;
mod world;

pub use runner::run_episode;
pub use summary::{EpisodeOutcome, EpisodeSummary};
pub use world::{Occupancy, SimUnit, SimWorld, UnitState};
