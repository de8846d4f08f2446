//! Belief state: per-cell tower probabilities and observation bookkeeping.
//!
//! [`ProbabilityGrid`] is the one mutable resource of an episode. Evidence
//! updates and vision writes mutate it; risk pricing and search only read it.
mod cell;
mod common;
mod grid;

pub use cell::{Cell, CellFlags};
pub use common::{Position, Tick, UnitId};
pub use grid::{GridError, ProbabilitySnapshot, ProbabilityGrid};
