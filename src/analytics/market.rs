use serde::{Deserialize, Serialize};

use super::{ensure_finite, AnalyticsError};

/// Bookmaker decimal odds for home win / draw / away win.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub odd1: f64,
    #[serde(alias = "oddX")]
    pub odd_x: f64,
    pub odd2: f64,
}

impl MatchOdds {
    pub fn new(odd1: f64, odd_x: f64, odd2: f64) -> Self {
        MatchOdds { odd1, odd_x, odd2 }
    }

    /// Every price must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        for (field, value) in [("odd1", self.odd1), ("odd_x", self.odd_x), ("odd2", self.odd2)] {
            let value = ensure_finite(field, value)?;
            if value <= 0.0 {
                return Err(AnalyticsError::InvalidInput(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Raw implied probabilities `1/odd`, still carrying the margin.
    fn implied(&self) -> (f64, f64, f64) {
        (1.0 / self.odd1, 1.0 / self.odd_x, 1.0 / self.odd2)
    }

    /// Bookmaker margin: how far the raw implied probabilities exceed 1.
    pub fn overround(&self) -> Result<f64, AnalyticsError> {
        self.validate()?;
        let (r1, rx, r2) = self.implied();
        Ok(r1 + rx + r2 - 1.0)
    }
}

/// Margin-free 1X2 probabilities implied by the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Strip the overround by rescaling `1/odd` so the three outcomes sum to 1.
pub fn normalize_market(odds: &MatchOdds) -> Result<MarketProbabilities, AnalyticsError> {
    odds.validate()?;
    let (r1, rx, r2) = odds.implied();
    let sum = r1 + rx + r2;
    Ok(MarketProbabilities {
        home: r1 / sum,
        draw: rx / sum,
        away: r2 / sum,
    })
}
