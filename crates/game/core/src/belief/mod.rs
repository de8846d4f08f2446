//! Tower belief maintenance: risk pricing, Bayesian evidence and vision.
mod evidence;
mod risk;
mod vision;

pub use evidence::{BayesianUpdater, EvidenceSummary};
pub use risk::{RiskAggregator, WeaponProfile};
pub use vision::{Sighting, record_sighting};
