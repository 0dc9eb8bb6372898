pub mod aggregator;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod numeric;
pub mod pipeline;
pub mod provider;
pub mod scoring;
pub mod statements;
pub mod types;

pub use error::ForensicError;
pub use pipeline::{analyze, run_for_ticker, AnalysisConfig, ForensicReport, ScoreSet, Scorecard};
pub use types::*;

/// Standard result type for all forensic operations
pub type ForensicResult<T> = Result<T, ForensicError>;
