//! Deterministic belief and planning logic for scouting hostile towers.
//!
//! `scout-core` keeps a probabilistic map of where towers are likely to be,
//! revises it from hit / no-hit evidence and direct sightings, and plans
//! movement that minimises cumulative exposure. It performs no I/O: the host
//! world is reached through [`env::WorldOracle`] and [`env::VisionOracle`],
//! randomness through [`env::RngOracle`], and persistence is left to the
//! runtime via [`ProbabilityGrid`]'s byte encoding.
pub mod belief;
pub mod config;
pub mod env;
pub mod error;
pub mod movement;
pub mod search;
pub mod state;
pub mod tracker;

pub use belief::{
    BayesianUpdater, EvidenceSummary, RiskAggregator, Sighting, WeaponProfile, record_sighting,
};
pub use config::ScoutConfig;
pub use env::{
    DrawContext, MapDimensions, OpenField, PcgRng, RngOracle, VisionOracle, WorldOracle,
    compute_seed,
};
pub use error::{CoreError, ErrorSeverity};
pub use movement::Direction;
pub use search::{NodeArena, NodeId, Path, PathError, RiskAwareSearch, SearchNode};
pub use state::{
    Cell, CellFlags, GridError, Position, ProbabilityGrid, ProbabilitySnapshot, Tick, UnitId,
};
pub use tracker::{
    BeliefTracker, DrawScope, StepDecision, StepRequest, TickOutcome, UnitReport,
};
