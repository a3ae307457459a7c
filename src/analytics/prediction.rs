//! Grading of saved manual picks against final scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Full-time result class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

/// A 1X2 or double-chance pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pick {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
    #[serde(rename = "1X")]
    HomeOrDraw,
    #[serde(rename = "X2")]
    DrawOrAway,
    #[serde(rename = "12")]
    HomeOrAway,
}

// Double chances first so "1X" is not read as "1".
const PICK_TOKENS: [(&str, Pick); 6] = [
    ("1X", Pick::HomeOrDraw),
    ("X2", Pick::DrawOrAway),
    ("12", Pick::HomeOrAway),
    ("1", Pick::Home),
    ("X", Pick::Draw),
    ("2", Pick::Away),
];

impl Pick {
    /// Find the first pick token in free text such as "1X (value)".
    pub fn find_in(text: &str) -> Option<Pick> {
        let upper = text.to_uppercase();
        (0..upper.len())
            .filter(|&i| upper.is_char_boundary(i))
            .find_map(|i| {
                let rest = &upper[i..];
                PICK_TOKENS
                    .iter()
                    .find(|(token, _)| rest.starts_with(token))
                    .map(|(_, pick)| *pick)
            })
    }

    pub fn covers(self, outcome: Outcome) -> bool {
        match self {
            Pick::Home => outcome == Outcome::Home,
            Pick::Draw => outcome == Outcome::Draw,
            Pick::Away => outcome == Outcome::Away,
            Pick::HomeOrDraw => outcome != Outcome::Away,
            Pick::DrawOrAway => outcome != Outcome::Home,
            Pick::HomeOrAway => outcome != Outcome::Draw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pick::Home => "1",
            Pick::Draw => "X",
            Pick::Away => "2",
            Pick::HomeOrDraw => "1X",
            Pick::DrawOrAway => "X2",
            Pick::HomeOrAway => "12",
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A final score written as "2-1" or "2:1".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub home: u32,
    pub away: u32,
}

impl FinalScore {
    pub fn outcome(&self) -> Outcome {
        if self.home > self.away {
            Outcome::Home
        } else if self.home < self.away {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }
}

impl FromStr for FinalScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (home, away) = s
            .split_once(['-', ':'])
            .ok_or_else(|| format!("expected a score like 2-1, got {s:?}"))?;
        let goals = |part: &str| -> Result<u32, String> {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("invalid goal count {part:?}"));
            }
            part.parse::<u32>().map_err(|e| e.to_string())
        };
        Ok(FinalScore {
            home: goals(home)?,
            away: goals(away)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Wrong,
    /// Pick or result missing or unreadable.
    Unknown,
}

/// Grade a free-text pick against a free-text final score.
pub fn grade(pick: &str, result: &str) -> Verdict {
    let Some(pick) = Pick::find_in(pick) else {
        return Verdict::Unknown;
    };
    match result.parse::<FinalScore>() {
        Ok(score) if pick.covers(score.outcome()) => Verdict::Correct,
        Ok(_) => Verdict::Wrong,
        Err(_) => Verdict::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_double_chance_before_single() {
        assert_eq!(Pick::find_in("1x"), Some(Pick::HomeOrDraw));
        assert_eq!(Pick::find_in("X2"), Some(Pick::DrawOrAway));
        assert_eq!(Pick::find_in("12"), Some(Pick::HomeOrAway));
        assert_eq!(Pick::find_in("2"), Some(Pick::Away));
        assert_eq!(Pick::find_in("punto secco: 1"), Some(Pick::Home));
        assert_eq!(Pick::find_in("gol"), None);
    }

    #[test]
    fn parses_scores_with_either_separator() {
        assert_eq!("2-1".parse::<FinalScore>(), Ok(FinalScore { home: 2, away: 1 }));
        assert_eq!(" 0 : 0 ".parse::<FinalScore>(), Ok(FinalScore { home: 0, away: 0 }));
        assert!("2-".parse::<FinalScore>().is_err());
        assert!("two-one".parse::<FinalScore>().is_err());
        assert!("2-1-0".parse::<FinalScore>().is_err());
        assert!("+2-1".parse::<FinalScore>().is_err());
    }

    #[test]
    fn grades_single_outcomes() {
        assert_eq!(grade("1", "2-1"), Verdict::Correct);
        assert_eq!(grade("X", "1-1"), Verdict::Correct);
        assert_eq!(grade("2", "2-1"), Verdict::Wrong);
    }

    #[test]
    fn grades_double_chances() {
        assert_eq!(grade("1X", "0-0"), Verdict::Correct);
        assert_eq!(grade("1X", "0-1"), Verdict::Wrong);
        assert_eq!(grade("X2", "1:3"), Verdict::Correct);
        assert_eq!(grade("12", "2-2"), Verdict::Wrong);
        assert_eq!(grade("12", "0-4"), Verdict::Correct);
    }

    #[test]
    fn unreadable_input_is_unknown() {
        assert_eq!(grade("", "2-1"), Verdict::Unknown);
        assert_eq!(grade("1", ""), Verdict::Unknown);
        assert_eq!(grade("1", "rinviata"), Verdict::Unknown);
    }
}
