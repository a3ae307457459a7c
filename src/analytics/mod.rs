//! Odds analytics engine.
//!
//! Pure, stateless transforms from bookmaker 1X2 odds and team goal records
//! to derived probabilities and fair odds:
//! - **Market**: overround-free implied probabilities from decimal odds
//! - **Poisson**: expected goals, truncated scoreline grid, 1X2 / BTTS / O-U
//! - **BVS**: heuristic theoretical odds anchored on the draw market
//! - **Recommendation**: the single shared "recommended fixture" predicate
//!
//! Nothing here performs I/O or holds state; every call is independent.

pub mod bvs;
pub mod market;
pub mod poisson;
pub mod prediction;
pub mod recommend;
pub mod report;

use thiserror::Error;

pub use market::MatchOdds;
pub use poisson::TeamForm;
pub use report::{analyze, AnalysisReport};

/// Engine failure. Anything else the engine computes is a total function
/// over validated input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Reject NaN/infinite values before they reach any arithmetic.
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticsError::InvalidInput(format!(
            "{field} must be a finite number, got {value}"
        )))
    }
}

/// Fair decimal odds for a probability in [0, 1]. A 0% outcome has no finite
/// fair price, reported as `None`.
pub fn fair_odds(probability: f64) -> Option<f64> {
    if probability > 0.0 && probability.is_finite() {
        Some(1.0 / probability)
    } else {
        None
    }
}
