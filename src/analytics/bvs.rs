//! BVS theoretical odds.
//!
//! A fixed ranking heuristic, not a fitted model: team attack aggregates are
//! scaled to share 95 points, the draw gets `100/oddX + 6` points anchored on
//! the market, and the three scores are rescaled by `106 / sum`. The
//! constants are part of the method and must stay as they are.

use serde::Serialize;

use super::poisson::TeamForm;
use super::{ensure_finite, fair_odds, AnalyticsError};

const ATTACK_POINTS: f64 = 95.0;
const DRAW_BASE: f64 = 100.0;
const DRAW_BONUS: f64 = 6.0;
const SCALE_POINTS: f64 = 106.0;

/// Scores exactly as the heuristic produces them, home / draw / away.
/// They add up to 106: the method keeps a 6-point book of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BvsScores {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl BvsScores {
    pub fn total(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// BVS percentages and their decimal odds.
///
/// `pct_*` are the heuristic scores themselves and `odds_* = 100 / pct_*`.
/// The `share_*` fields are the same scores rescaled to add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TheoreticalOdds {
    pub pct_home: f64,
    pub pct_draw: f64,
    pub pct_away: f64,
    pub odds_home: Option<f64>,
    pub odds_draw: Option<f64>,
    pub odds_away: Option<f64>,
    pub share_home: f64,
    pub share_draw: f64,
    pub share_away: f64,
}

/// Raw heuristic scores. When neither side has any goals for or against,
/// there is no attack strength to share and both outright scores are 0.
pub fn bvs_scores(
    home: &TeamForm,
    away: &TeamForm,
    odd_x: f64,
) -> Result<BvsScores, AnalyticsError> {
    home.validate("home")?;
    away.validate("away")?;
    let odd_x = ensure_finite("odd_x", odd_x)?;
    if odd_x <= 0.0 {
        return Err(AnalyticsError::InvalidInput(format!(
            "odd_x must be positive, got {odd_x}"
        )));
    }

    let at = (home.goals_for + away.goals_against) / home.games_played;
    let av = (away.goals_for + home.goals_against) / away.games_played;

    let (at2, av2) = if at + av > 0.0 {
        let k1 = ATTACK_POINTS / (at + av);
        (k1 * at, k1 * av)
    } else {
        (0.0, 0.0)
    };
    let aw = DRAW_BASE / odd_x + DRAW_BONUS;
    let k2 = SCALE_POINTS / (at2 + av2 + aw);

    Ok(BvsScores {
        home: at2 * k2,
        draw: aw * k2,
        away: av2 * k2,
    })
}

/// BVS theoretical probabilities in percent and the matching odds.
pub fn bvs(
    home: &TeamForm,
    away: &TeamForm,
    odd_x: f64,
) -> Result<TheoreticalOdds, AnalyticsError> {
    let scores = bvs_scores(home, away, odd_x)?;
    let scale = 100.0 / scores.total();

    Ok(TheoreticalOdds {
        pct_home: scores.home,
        pct_draw: scores.draw,
        pct_away: scores.away,
        odds_home: fair_odds(scores.home / 100.0),
        odds_draw: fair_odds(scores.draw / 100.0),
        odds_away: fair_odds(scores.away / 100.0),
        share_home: scores.home * scale,
        share_draw: scores.draw * scale,
        share_away: scores.away * scale,
    })
}
