//! Risk-aware path planning.
mod node;
mod planner;

pub use node::{NodeArena, NodeId, SearchNode};
pub use planner::{Path, PathError, RiskAwareSearch};
