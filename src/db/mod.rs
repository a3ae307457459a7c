use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::analytics::recommend::{delta_bv, is_recommended};

pub mod models;
use models::*;

/// Upload dates are Italian-style day/month/year.
pub const UPLOAD_DATE_FORMAT: &str = "%d/%m/%Y";

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    // ── Fixtures ──────────────────────────────────────────────────────────────

    /// Replace the whole fixture list in one transaction. Rows whose date
    /// cannot be read are skipped; any storage error rolls everything back.
    pub fn replace_all_fixtures(&self, uploads: &[FixtureUpload]) -> Result<ReplaceSummary> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM fixtures", [])?;

        let mut inserted = 0;
        let mut skipped = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO fixtures (
                    date, time, league, country, home, away,
                    odd1, odd_x, odd2, delta_bv
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            )?;
            for up in uploads {
                let Some(date) = up.date.as_deref().and_then(parse_upload_date) else {
                    debug!("Skipping fixture with unreadable date {:?}", up.date);
                    skipped += 1;
                    continue;
                };
                stmt.execute(params![
                    date,
                    text_or_empty(&up.time),
                    text_or_empty(&up.league),
                    text_or_empty(&up.country),
                    text_or_empty(&up.home),
                    text_or_empty(&up.away),
                    up.odd1,
                    up.odd_x,
                    up.odd2,
                    delta_bv(up.odd1, up.odd2),
                ])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok(ReplaceSummary { inserted, skipped })
    }

    /// Fixtures on or after `from`, ordered by kick-off.
    pub fn list_fixtures_from(
        &self,
        from: NaiveDate,
        filter: &FixtureFilter,
    ) -> Result<Vec<Fixture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, date, time, league, country, home, away,
                    odd1, odd_x, odd2, delta_bv
             FROM fixtures
             WHERE date >= ?1
               AND (?2 IS NULL OR date = ?2)
               AND (?3 IS NULL OR country = ?3)
               AND (?4 IS NULL OR league = ?4)
             ORDER BY date ASC, time ASC",
        )?;
        let fixtures = stmt
            .query_map(
                params![from, filter.date, filter.country, filter.league],
                map_fixture,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if filter.recommended_only {
            return Ok(fixtures
                .into_iter()
                .filter(|f| is_recommended(&f.prices()))
                .collect());
        }
        Ok(fixtures)
    }

    /// Distinct non-empty countries and leagues among fixtures on or after `from`.
    pub fn filter_options(&self, from: NaiveDate) -> Result<FilterOptions> {
        let conn = self.conn()?;
        let distinct = |column: &str| -> Result<Vec<String>> {
            let mut stmt = conn.prepare(&format!(
                "SELECT DISTINCT {column} FROM fixtures
                 WHERE date >= ?1 AND {column} <> ''
                 ORDER BY {column} ASC"
            ))?;
            let values = stmt
                .query_map(params![from], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(values)
        };
        Ok(FilterOptions {
            countries: distinct("country")?,
            leagues: distinct("league")?,
        })
    }

    // ── Predictions ───────────────────────────────────────────────────────────

    pub fn insert_prediction(&self, fixture: &str, pick: &str) -> Result<Prediction> {
        let conn = self.conn()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO predictions (fixture, pick, note, result, created_at)
             VALUES (?1, ?2, '', '', ?3)",
            params![fixture, pick, created_at],
        )?;
        Ok(Prediction {
            id: conn.last_insert_rowid(),
            fixture: fixture.to_string(),
            pick: pick.to_string(),
            note: String::new(),
            result: String::new(),
            created_at,
        })
    }

    /// All predictions, oldest first
    pub fn list_predictions(&self) -> Result<Vec<Prediction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, fixture, pick, note, result, created_at
             FROM predictions ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map([], map_prediction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Returns `false` when no prediction has this id.
    pub fn update_prediction_note(&self, id: i64, note: &str) -> Result<bool> {
        let conn = self.conn()?;
        let n = conn.execute(
            "UPDATE predictions SET note=?1 WHERE id=?2",
            params![note, id],
        )?;
        Ok(n > 0)
    }

    /// Returns `false` when no prediction has this id.
    pub fn update_prediction_result(&self, id: i64, result: &str) -> Result<bool> {
        let conn = self.conn()?;
        let n = conn.execute(
            "UPDATE predictions SET result=?1 WHERE id=?2",
            params![result, id],
        )?;
        Ok(n > 0)
    }

    /// Returns `false` when no prediction has this id.
    pub fn delete_prediction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM predictions WHERE id=?1", params![id])?;
        Ok(n > 0)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

pub fn parse_upload_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), UPLOAD_DATE_FORMAT).ok()
}

fn text_or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn map_fixture(row: &rusqlite::Row) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        league: row.get(3)?,
        country: row.get(4)?,
        home: row.get(5)?,
        away: row.get(6)?,
        odd1: row.get(7)?,
        odd_x: row.get(8)?,
        odd2: row.get(9)?,
        delta_bv: row.get(10)?,
    })
}

fn map_prediction(row: &rusqlite::Row) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        id: row.get(0)?,
        fixture: row.get(1)?,
        pick: row.get(2)?,
        note: row.get(3)?,
        result: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS fixtures (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    date      TEXT    NOT NULL,
    time      TEXT    NOT NULL,
    league    TEXT    NOT NULL DEFAULT '',
    country   TEXT    NOT NULL DEFAULT '',
    home      TEXT    NOT NULL DEFAULT '',
    away      TEXT    NOT NULL DEFAULT '',
    odd1      REAL,
    odd_x     REAL,
    odd2      REAL,
    delta_bv  REAL
);

CREATE TABLE IF NOT EXISTS predictions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    fixture     TEXT    NOT NULL,
    pick        TEXT    NOT NULL,
    note        TEXT    NOT NULL DEFAULT '',
    result      TEXT    NOT NULL DEFAULT '',
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_fixtures_date ON fixtures(date, time);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(date: &str, home: &str, away: &str, odds: (f64, f64, f64)) -> FixtureUpload {
        FixtureUpload {
            date: Some(date.to_string()),
            time: Some("20:45".to_string()),
            league: Some("Serie A".to_string()),
            country: Some("Italia".to_string()),
            home: Some(home.to_string()),
            away: Some(away.to_string()),
            odd1: Some(odds.0),
            odd_x: Some(odds.1),
            odd2: Some(odds.2),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn replace_skips_bad_dates_and_stores_delta() {
        let db = Database::open(":memory:").unwrap();
        let bad = upload("2026-09-21", "A", "B", (2.0, 3.0, 4.0));
        let summary = db
            .replace_all_fixtures(&[upload("21/09/2026", "Roma", "Lazio", (2.0, 3.1, 3.5)), bad])
            .unwrap();
        assert_eq!(summary, ReplaceSummary { inserted: 1, skipped: 1 });

        let rows = db.list_fixtures_from(day(2026, 1, 1), &FixtureFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(2026, 9, 21));
        assert_eq!(rows[0].delta_bv, Some(1.5));
    }

    #[test]
    fn replace_discards_previous_list() {
        let db = Database::open(":memory:").unwrap();
        db.replace_all_fixtures(&[upload("01/10/2026", "A", "B", (2.0, 3.0, 4.0))]).unwrap();
        db.replace_all_fixtures(&[
            upload("02/10/2026", "C", "D", (2.0, 3.0, 4.0)),
            upload("03/10/2026", "E", "F", (2.0, 3.0, 4.0)),
        ])
        .unwrap();
        let rows = db.list_fixtures_from(day(2026, 1, 1), &FixtureFilter::default()).unwrap();
        let homes: Vec<&str> = rows.iter().map(|f| f.home.as_str()).collect();
        assert_eq!(homes, vec!["C", "E"]);
    }

    #[test]
    fn missing_fields_default_to_empty_and_null() {
        let db = Database::open(":memory:").unwrap();
        let sparse = FixtureUpload {
            date: Some("05/10/2026".to_string()),
            odd1: Some(1.9),
            ..Default::default()
        };
        db.replace_all_fixtures(&[sparse]).unwrap();
        let rows = db.list_fixtures_from(day(2026, 1, 1), &FixtureFilter::default()).unwrap();
        assert_eq!(rows[0].home, "");
        assert_eq!(rows[0].time, "");
        assert_eq!(rows[0].odd_x, None);
        assert_eq!(rows[0].delta_bv, None);
    }

    #[test]
    fn list_orders_by_date_then_time_and_honours_from() {
        let db = Database::open(":memory:").unwrap();
        let mut late = upload("10/10/2026", "Late", "X", (2.0, 3.0, 4.0));
        late.time = Some("21:00".to_string());
        let mut early = upload("10/10/2026", "Early", "X", (2.0, 3.0, 4.0));
        early.time = Some("12:30".to_string());
        let past = upload("01/10/2026", "Past", "X", (2.0, 3.0, 4.0));
        db.replace_all_fixtures(&[late, past, early]).unwrap();

        let rows = db.list_fixtures_from(day(2026, 10, 5), &FixtureFilter::default()).unwrap();
        let homes: Vec<&str> = rows.iter().map(|f| f.home.as_str()).collect();
        assert_eq!(homes, vec!["Early", "Late"]);
    }

    #[test]
    fn filters_by_country_league_date_and_recommendation() {
        let db = Database::open(":memory:").unwrap();
        let mut england = upload("11/10/2026", "Arsenal", "Spurs", (2.0, 3.4, 3.6));
        england.country = Some("Inghilterra".to_string());
        england.league = Some("Premier League".to_string());
        // delta 1.6, draw shorter than away -> recommended
        let recommended = upload("11/10/2026", "Roma", "Lazio", (2.0, 3.2, 3.6));
        // delta 4.0 -> not recommended
        let lopsided = upload("12/10/2026", "Inter", "Lecce", (1.3, 5.0, 5.3));
        db.replace_all_fixtures(&[england, recommended, lopsided]).unwrap();
        let from = day(2026, 10, 1);

        let italy = FixtureFilter {
            country: Some("Italia".to_string()),
            ..Default::default()
        };
        assert_eq!(db.list_fixtures_from(from, &italy).unwrap().len(), 2);

        let prem = FixtureFilter {
            league: Some("Premier League".to_string()),
            ..Default::default()
        };
        assert_eq!(db.list_fixtures_from(from, &prem).unwrap()[0].home, "Arsenal");

        let on_day = FixtureFilter {
            date: Some(day(2026, 10, 12)),
            ..Default::default()
        };
        assert_eq!(db.list_fixtures_from(from, &on_day).unwrap()[0].home, "Inter");

        let rec = FixtureFilter {
            recommended_only: true,
            country: Some("Italia".to_string()),
            ..Default::default()
        };
        let rows = db.list_fixtures_from(from, &rec).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].home, "Roma");
    }

    #[test]
    fn zero_draw_price_is_never_recommended() {
        let db = Database::open(":memory:").unwrap();
        db.replace_all_fixtures(&[upload("11/10/2026", "Roma", "Lazio", (2.0, 0.0, 3.0))])
            .unwrap();
        let from = day(2026, 10, 1);

        let all = db.list_fixtures_from(from, &FixtureFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].odd_x, Some(0.0));

        let rec = FixtureFilter {
            recommended_only: true,
            ..Default::default()
        };
        assert!(db.list_fixtures_from(from, &rec).unwrap().is_empty());
    }

    #[test]
    fn filter_options_are_distinct_and_sorted() {
        let db = Database::open(":memory:").unwrap();
        let mut spain = upload("11/10/2026", "Betis", "Sevilla", (2.0, 3.0, 4.0));
        spain.country = Some("Spagna".to_string());
        spain.league = Some("Liga".to_string());
        let mut blank = upload("11/10/2026", "?", "?", (2.0, 3.0, 4.0));
        blank.country = None;
        blank.league = None;
        db.replace_all_fixtures(&[
            spain,
            upload("11/10/2026", "Roma", "Lazio", (2.0, 3.0, 4.0)),
            upload("12/10/2026", "Milan", "Como", (2.0, 3.0, 4.0)),
            blank,
        ])
        .unwrap();
        let opts = db.filter_options(day(2026, 10, 1)).unwrap();
        assert_eq!(opts.countries, vec!["Italia", "Spagna"]);
        assert_eq!(opts.leagues, vec!["Liga", "Serie A"]);
    }

    #[test]
    fn prediction_lifecycle() {
        let db = Database::open(":memory:").unwrap();
        let p = db.insert_prediction("Roma - Lazio", "1X").unwrap();
        assert!(db.update_prediction_note(p.id, "derby").unwrap());
        assert!(db.update_prediction_result(p.id, "1-1").unwrap());

        let all = db.list_predictions().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].note, "derby");
        assert_eq!(all[0].result, "1-1");

        assert!(db.delete_prediction(p.id).unwrap());
        assert!(!db.delete_prediction(p.id).unwrap());
        assert!(!db.update_prediction_note(p.id, "gone").unwrap());
        assert!(db.list_predictions().unwrap().is_empty());
    }

    #[test]
    fn parses_upload_dates() {
        assert_eq!(parse_upload_date("21/09/2026"), Some(day(2026, 9, 21)));
        assert_eq!(parse_upload_date(" 1/2/2027 "), Some(day(2027, 2, 1)));
        assert_eq!(parse_upload_date("2026-09-21"), None);
        assert_eq!(parse_upload_date("31/02/2026"), None);
    }
}
