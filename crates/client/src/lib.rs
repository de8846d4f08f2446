//! Simulation client for the tower-scouting agent.
//!
//! # Architecture
//!
//! ```text
//! scout (binary)
//!   ├─→ scout-content (scenario + config files)
//!   ├─→ scout-runtime (episodes, persisted boards)
//!   └─→ sim (ground-truth world the agent is tested against)
//! ```
//!
//! The simulated world knows where the towers are and fires them; the agent
//! only sees what the runtime hands it each tick.

pub mod sim;

pub use sim::{EpisodeOutcome, EpisodeSummary, SimUnit, SimWorld, UnitState, run_episode};
