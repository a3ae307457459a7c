//! Poisson goal model.
//!
//! Each side's goals are modelled as an independent Poisson variable whose
//! mean averages the side's own scoring rate with the opponent's conceding
//! rate. The joint distribution is enumerated on a bounded `0..=max_goals`
//! grid and renormalized by the captured mass, so every outcome partition
//! (1/X/2, BTTS/no-BTTS, over/under per line) sums to 1.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, AnalyticsError};

/// Default grid bound. The omitted tail is negligible for rates below ~4.
pub const DEFAULT_MAX_GOALS: u32 = 6;

/// Largest per-side bound accepted for the scoreline grid.
pub const MAX_GOALS_LIMIT: u32 = 20;

/// Total-goals lines priced by the over/under market.
pub const GOAL_LINES: [f64; 4] = [0.5, 1.5, 2.5, 3.5];

/// Season goal record for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    pub goals_for: f64,
    pub goals_against: f64,
    pub games_played: f64,
}

impl TeamForm {
    pub fn new(goals_for: f64, goals_against: f64, games_played: f64) -> Self {
        TeamForm {
            goals_for,
            goals_against,
            games_played,
        }
    }

    /// Check the record can be used as a divisor source. `side` names the
    /// team in the error message ("home" / "away").
    pub fn validate(&self, side: &str) -> Result<(), AnalyticsError> {
        let goals_for = ensure_finite(&format!("{side}.goals_for"), self.goals_for)?;
        let goals_against = ensure_finite(&format!("{side}.goals_against"), self.goals_against)?;
        let games = ensure_finite(&format!("{side}.games_played"), self.games_played)?;
        if goals_for < 0.0 || goals_against < 0.0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "{side} goal counts must be non-negative"
            )));
        }
        if games <= 0.0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "{side}.games_played must be positive, got {games}"
            )));
        }
        Ok(())
    }

    fn scored_per_game(&self) -> f64 {
        self.goals_for / self.games_played
    }

    fn conceded_per_game(&self) -> f64 {
        self.goals_against / self.games_played
    }
}

/// Poisson means for the fixture being analysed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedGoals {
    pub lambda_home: f64,
    pub lambda_away: f64,
}

/// P(X = k) for X ~ Poisson(lambda).
///
/// A non-positive rate means "no scoring model" and yields 0 for every `k`,
/// including `k = 0`. Uses the multiplicative recurrence
/// `P(k) = P(k-1) * lambda / k` instead of factorials.
pub fn poisson(k: u32, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    let mut p = (-lambda).exp();
    for i in 1..=k {
        p *= lambda / i as f64;
    }
    p
}

/// Two-factor strength estimate: own scoring rate averaged with the
/// opponent's conceding rate.
pub fn expected_goals(home: &TeamForm, away: &TeamForm) -> Result<ExpectedGoals, AnalyticsError> {
    home.validate("home")?;
    away.validate("away")?;
    Ok(ExpectedGoals {
        lambda_home: (home.scored_per_game() + away.conceded_per_game()) / 2.0,
        lambda_away: (away.scored_per_game() + home.conceded_per_game()) / 2.0,
    })
}

/// One cell of the truncated joint distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scoreline {
    pub home_goals: u32,
    pub away_goals: u32,
    pub probability: f64,
}

/// Joint scoreline probabilities on `0..=max_goals` for both sides.
#[derive(Debug, Clone)]
pub struct ScorelineGrid {
    pub max_goals: u32,
    pub cells: Vec<Scoreline>,
}

impl ScorelineGrid {
    pub fn build(expected: &ExpectedGoals, max_goals: u32) -> Self {
        let home: Vec<f64> = (0..=max_goals)
            .map(|k| poisson(k, expected.lambda_home))
            .collect();
        let away: Vec<f64> = (0..=max_goals)
            .map(|k| poisson(k, expected.lambda_away))
            .collect();

        let mut cells = Vec::with_capacity(home.len() * away.len());
        for (i, p_home) in home.iter().enumerate() {
            for (j, p_away) in away.iter().enumerate() {
                cells.push(Scoreline {
                    home_goals: i as u32,
                    away_goals: j as u32,
                    probability: p_home * p_away,
                });
            }
        }
        ScorelineGrid { max_goals, cells }
    }

    /// Probability mass captured by the grid (< 1 by the truncated tail).
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().map(|c| c.probability).sum()
    }
}

/// Over/under pair for one total-goals line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverUnder {
    pub line: f64,
    pub over: f64,
    pub under: f64,
}

/// Outcome probabilities aggregated from the grid, normalized by its mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub both_teams_score: f64,
    pub no_both_teams_score: f64,
    pub over_under: Vec<OverUnder>,
}

/// Aggregate the scoreline grid into outcome classes.
///
/// When the grid holds no mass at all (a zero scoring rate on either side),
/// every probability is reported as 0 rather than dividing by zero.
pub fn build_distribution(expected: &ExpectedGoals, max_goals: u32) -> OutcomeProbabilities {
    let grid = ScorelineGrid::build(expected, max_goals);

    let mut home_win = 0.0;
    let mut draw = 0.0;
    let mut away_win = 0.0;
    let mut btts = 0.0;
    let mut no_btts = 0.0;
    let mut over = [0.0; GOAL_LINES.len()];
    let mut under = [0.0; GOAL_LINES.len()];
    let mut total = 0.0;

    for cell in &grid.cells {
        let p = cell.probability;
        let (i, j) = (cell.home_goals, cell.away_goals);
        total += p;

        if i > j {
            home_win += p;
        } else if i == j {
            draw += p;
        } else {
            away_win += p;
        }

        if i > 0 && j > 0 {
            btts += p;
        } else {
            no_btts += p;
        }

        let goals = (i + j) as f64;
        for (idx, line) in GOAL_LINES.iter().enumerate() {
            if goals > *line {
                over[idx] += p;
            } else {
                under[idx] += p;
            }
        }
    }

    let norm = |x: f64| if total > 0.0 { x / total } else { 0.0 };

    OutcomeProbabilities {
        home_win: norm(home_win),
        draw: norm(draw),
        away_win: norm(away_win),
        both_teams_score: norm(btts),
        no_both_teams_score: norm(no_btts),
        over_under: GOAL_LINES
            .iter()
            .enumerate()
            .map(|(idx, line)| OverUnder {
                line: *line,
                over: norm(over[idx]),
                under: norm(under[idx]),
            })
            .collect(),
    }
}
