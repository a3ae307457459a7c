use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analytics::recommend::FixturePrices;

/// A fixture as uploaded by the admin feed. Every field may be missing;
/// dates are `dd/mm/yyyy`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureUpload {
    pub date: Option<String>,
    pub time: Option<String>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub home: Option<String>,
    pub away: Option<String>,
    #[serde(default, deserialize_with = "lenient_odd")]
    pub odd1: Option<f64>,
    #[serde(default, rename = "oddX", alias = "odd_x", deserialize_with = "lenient_odd")]
    pub odd_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_odd")]
    pub odd2: Option<f64>,
}

/// A stored fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: i64,
    pub date: NaiveDate,
    /// "HH:MM"
    pub time: String,
    pub league: String,
    pub country: String,
    pub home: String,
    pub away: String,
    pub odd1: Option<f64>,
    pub odd_x: Option<f64>,
    pub odd2: Option<f64>,
    /// |odd1 - odd2|, fixed at ingestion
    pub delta_bv: Option<f64>,
}

impl Fixture {
    pub fn prices(&self) -> FixturePrices {
        FixturePrices {
            odd1: self.odd1,
            odd_x: self.odd_x,
            odd2: self.odd2,
            delta_bv: self.delta_bv,
        }
    }
}

/// Query-time narrowing of the fixture list.
#[derive(Debug, Clone, Default)]
pub struct FixtureFilter {
    pub date: Option<NaiveDate>,
    pub country: Option<String>,
    pub league: Option<String>,
    pub recommended_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    pub inserted: usize,
    /// Rows dropped for an unreadable date
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub leagues: Vec<String>,
}

/// A saved manual pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    /// "Home - Away"
    pub fixture: String,
    pub pick: String,
    pub note: String,
    /// Final score as typed, e.g. "2-1"; empty until known
    pub result: String,
    pub created_at: DateTime<Utc>,
}

/// Accept numbers, numeric strings (comma or dot decimals) and null.
fn lenient_odd<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        None => None,
    }
    .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_accepts_numbers_and_text_odds() {
        let json = r#"{"date":"21/09/2026","home":"Roma","away":"Lazio",
                       "odd1":2.1,"oddX":"3,25","odd2":null}"#;
        let f: FixtureUpload = serde_json::from_str(json).unwrap();
        assert_eq!(f.odd1, Some(2.1));
        assert_eq!(f.odd_x, Some(3.25));
        assert_eq!(f.odd2, None);
        assert_eq!(f.league, None);
    }

    #[test]
    fn upload_treats_garbage_odds_as_missing() {
        let f: FixtureUpload = serde_json::from_str(r#"{"odd1":"n/a"}"#).unwrap();
        assert_eq!(f.odd1, None);
        assert_eq!(f.odd_x, None);
    }
}
