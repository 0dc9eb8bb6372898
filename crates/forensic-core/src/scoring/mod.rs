//! Forensic scorers. Each reads the feature table and scores the latest year.

pub mod beneish;
pub mod piotroski;
pub mod rem;

pub use beneish::{calculate_beneish_proxy, BeneishProxyOutput};
pub use piotroski::{calculate_piotroski_proxy, PiotroskiProxyOutput};
pub use rem::{calculate_rem_risk, RemRiskOutput, RemSignal};
