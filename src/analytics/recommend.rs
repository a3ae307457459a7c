//! The "recommended fixture" predicate.
//!
//! Storage computes `delta_bv` with [`delta_bv`] once at ingestion, and the
//! query layer and the analysis API both decide through [`is_recommended`].
//! No other code path re-derives the condition.

use serde::{Deserialize, Serialize};

use super::market::MatchOdds;

/// Largest home/away price spread a recommended fixture may have (inclusive).
pub const MAX_DELTA_BV: f64 = 1.8;

/// Absolute spread between the home-win and away-win prices.
pub fn delta_bv(odd1: Option<f64>, odd2: Option<f64>) -> Option<f64> {
    match (usable(odd1), usable(odd2)) {
        (Some(a), Some(b)) => Some((a - b).abs()),
        _ => None,
    }
}

/// Prices of a stored fixture. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixturePrices {
    pub odd1: Option<f64>,
    pub odd_x: Option<f64>,
    pub odd2: Option<f64>,
    pub delta_bv: Option<f64>,
}

impl FixturePrices {
    /// Complete prices with a caller-supplied spread, falling back to
    /// `|odd1 - odd2|` when none is given.
    pub fn from_odds(odds: &MatchOdds, delta: Option<f64>) -> Self {
        let odd1 = Some(odds.odd1);
        let odd2 = Some(odds.odd2);
        FixturePrices {
            odd1,
            odd_x: Some(odds.odd_x),
            odd2,
            delta_bv: delta.or_else(|| delta_bv(odd1, odd2)),
        }
    }
}

/// Recommended iff `delta_bv <= 1.8` and the draw is priced no longer than at
/// least one outright result.
///
/// A fixture missing any of `odd1`, `oddX`, `odd2` or `delta_bv` cannot be
/// evaluated and is never recommended. Zero or negative prices count as
/// missing.
pub fn is_recommended(prices: &FixturePrices) -> bool {
    let (Some(odd1), Some(odd_x), Some(odd2), Some(delta)) = (
        usable(prices.odd1),
        usable(prices.odd_x),
        usable(prices.odd2),
        usable(prices.delta_bv),
    ) else {
        return false;
    };
    delta <= MAX_DELTA_BV && (odd_x <= odd1 || odd_x <= odd2)
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(odd1: f64, odd_x: f64, odd2: f64, delta: f64) -> FixturePrices {
        FixturePrices {
            odd1: Some(odd1),
            odd_x: Some(odd_x),
            odd2: Some(odd2),
            delta_bv: Some(delta),
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(is_recommended(&prices(3.0, 3.0, 4.8, 1.8)));
        assert!(!is_recommended(&prices(3.0, 3.0, 4.81, 1.81)));
    }

    #[test]
    fn draw_must_not_be_longest_price() {
        // Spread is fine but the draw is longer than both outrights.
        assert!(!is_recommended(&prices(2.4, 3.4, 3.0, 0.6)));
        // Draw shorter than the away price only.
        assert!(is_recommended(&prices(2.4, 3.0, 3.4, 1.0)));
    }

    #[test]
    fn missing_fields_are_excluded() {
        let full = prices(3.0, 3.0, 3.5, 0.5);
        assert!(is_recommended(&full));
        for incomplete in [
            FixturePrices { odd1: None, ..full },
            FixturePrices { odd_x: None, ..full },
            FixturePrices { odd2: None, ..full },
            FixturePrices { delta_bv: None, ..full },
            FixturePrices { delta_bv: Some(f64::NAN), ..full },
        ] {
            assert!(!is_recommended(&incomplete));
        }
    }

    #[test]
    fn non_positive_prices_are_excluded() {
        let zero_draw = FixturePrices {
            odd1: Some(2.0),
            odd_x: Some(0.0),
            odd2: Some(3.0),
            delta_bv: delta_bv(Some(2.0), Some(3.0)),
        };
        assert!(!is_recommended(&zero_draw));

        let negative = FixturePrices {
            odd1: Some(-2.0),
            odd_x: Some(-5.0),
            odd2: Some(-1.0),
            delta_bv: Some(1.0),
        };
        assert!(!is_recommended(&negative));
        assert_eq!(delta_bv(Some(-2.0), Some(-1.0)), None);
        assert_eq!(delta_bv(Some(0.0), Some(3.0)), None);
    }

    #[test]
    fn delta_is_absolute_spread() {
        assert_eq!(delta_bv(Some(2.0), Some(3.5)), Some(1.5));
        assert_eq!(delta_bv(Some(3.5), Some(2.0)), Some(1.5));
        assert_eq!(delta_bv(None, Some(2.0)), None);
        assert_eq!(delta_bv(Some(2.0), None), None);
    }

    #[test]
    fn from_odds_prefers_supplied_delta() {
        let odds = MatchOdds::new(2.0, 3.2, 5.0);
        let derived = FixturePrices::from_odds(&odds, None);
        assert_eq!(derived.delta_bv, Some(3.0));
        assert!(!is_recommended(&derived));

        let supplied = FixturePrices::from_odds(&odds, Some(1.0));
        assert_eq!(supplied.delta_bv, Some(1.0));
        assert!(is_recommended(&supplied));
    }
}
