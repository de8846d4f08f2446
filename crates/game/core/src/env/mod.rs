//! Host-facing traits and world geometry.
//!
//! The host simulation owns the real world; the planner only sees it through
//! [`WorldOracle`] (live blockers) and draws randomness through [`RngOracle`].
mod map;
mod rng;

pub use map::{MapDimensions, OpenField, VisionOracle, WorldOracle};
pub use rng::{DrawContext, PcgRng, RngOracle, compute_seed};
