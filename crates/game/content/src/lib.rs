//! Data-driven content for scouting runs.
//!
//! This crate provides loaders for the files that describe a run:
//! - Agent tuning (data-driven via TOML)
//! - Scenario layouts with hidden towers and units (data-driven via RON)
//!
//! Content describes the world the agent is dropped into; the agent itself
//! only ever learns about it through observations.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, Scenario, ScenarioLoader, UnitSpec};
