use serde::Serialize;

use super::bvs::{bvs, TheoreticalOdds};
use super::market::{normalize_market, MatchOdds};
use super::poisson::{
    build_distribution, expected_goals, ExpectedGoals, TeamForm, DEFAULT_MAX_GOALS,
    MAX_GOALS_LIMIT,
};
use super::{fair_odds, AnalyticsError};

/// A probability in [0, 1] with its fair decimal odds (`None` when 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Priced {
    pub probability: f64,
    pub odds: Option<f64>,
}

impl Priced {
    fn new(probability: f64) -> Self {
        Priced {
            probability,
            odds: fair_odds(probability),
        }
    }
}

/// Home win / draw / away win.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThreeWay {
    pub home: Priced,
    pub draw: Priced,
    pub away: Priced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoubleChance {
    /// 1X
    pub home_or_draw: Priced,
    /// 12
    pub home_or_away: Priced,
    /// X2
    pub draw_or_away: Priced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BothTeamsToScore {
    pub yes: Priced,
    pub no: Priced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalLine {
    pub line: f64,
    pub over: Priced,
    pub under: Priced,
}

/// Everything derived for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub expected_goals: ExpectedGoals,
    /// Bookmaker margin carried by the quoted 1X2 prices.
    pub overround: f64,
    /// Margin-free market probabilities.
    pub market: ThreeWay,
    pub bvs: TheoreticalOdds,
    /// 1X2 from the Poisson scoreline model.
    pub poisson: ThreeWay,
    pub double_chance: DoubleChance,
    pub both_teams_to_score: BothTeamsToScore,
    pub over_under: Vec<GoalLine>,
}

/// Full analysis on the default 0..=6 scoreline grid.
pub fn analyze(
    odds: &MatchOdds,
    home: &TeamForm,
    away: &TeamForm,
) -> Result<AnalysisReport, AnalyticsError> {
    analyze_with_max_goals(odds, home, away, DEFAULT_MAX_GOALS)
}

/// Full analysis. The grid bound must lie in `1..=MAX_GOALS_LIMIT`; odds are
/// validated before team form and the first invalid field aborts the whole
/// report.
pub fn analyze_with_max_goals(
    odds: &MatchOdds,
    home: &TeamForm,
    away: &TeamForm,
    max_goals: u32,
) -> Result<AnalysisReport, AnalyticsError> {
    if !(1..=MAX_GOALS_LIMIT).contains(&max_goals) {
        return Err(AnalyticsError::InvalidInput(format!(
            "max_goals must be between 1 and {MAX_GOALS_LIMIT}, got {max_goals}"
        )));
    }
    let market = normalize_market(odds)?;
    let expected = expected_goals(home, away)?;
    let theoretical = bvs(home, away, odds.odd_x)?;
    let outcomes = build_distribution(&expected, max_goals);
    let overround = odds.overround()?;

    let (p1, px, p2) = (outcomes.home_win, outcomes.draw, outcomes.away_win);

    Ok(AnalysisReport {
        expected_goals: expected,
        overround,
        market: ThreeWay {
            home: Priced::new(market.home),
            draw: Priced::new(market.draw),
            away: Priced::new(market.away),
        },
        bvs: theoretical,
        poisson: ThreeWay {
            home: Priced::new(p1),
            draw: Priced::new(px),
            away: Priced::new(p2),
        },
        double_chance: DoubleChance {
            home_or_draw: Priced::new(p1 + px),
            home_or_away: Priced::new(p1 + p2),
            draw_or_away: Priced::new(px + p2),
        },
        both_teams_to_score: BothTeamsToScore {
            yes: Priced::new(outcomes.both_teams_score),
            no: Priced::new(outcomes.no_both_teams_score),
        },
        over_under: outcomes
            .over_under
            .iter()
            .map(|ou| GoalLine {
                line: ou.line,
                over: Priced::new(ou.over),
                under: Priced::new(ou.under),
            })
            .collect(),
    })
}
