//! Machine-readable result of one simulated episode.
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// Every surviving unit reached the goal.
    Completed,
    /// No unit survived.
    WipedOut,
    /// The tick limit was hit with units still under way.
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub scenario: String,
    pub board: String,
    pub seed: u64,
    pub resumed: bool,
    pub outcome: EpisodeOutcome,
    pub ticks: u64,
    pub arrived: usize,
    pub died: usize,
    pub hits: u64,
    /// Towers the final belief marks as certain.
    pub towers_found: usize,
    pub towers_total: usize,
}
