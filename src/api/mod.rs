use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::analytics::prediction::{grade, Verdict};
use crate::analytics::recommend::{is_recommended, FixturePrices};
use crate::analytics::report::{analyze_with_max_goals, AnalysisReport};
use crate::analytics::{MatchOdds, TeamForm};
use crate::db::models::{FilterOptions, Fixture, FixtureFilter, FixtureUpload, Prediction};
use crate::db::{Database, UPLOAD_DATE_FORMAT};

pub mod error;
pub use error::ApiError;

/// Header carrying the admin upload key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub admin_key: String,
    /// Scoreline grid bound used by `/api/analyze`
    pub max_goals: u32,
}

/// Build the Axum router for the fixture API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/filters", get(filters_handler))
        .route("/api/admin/upload-palinsesto", post(upload_handler))
        .route("/api/analyze", post(analyze_handler))
        .route(
            "/api/predictions",
            get(list_predictions_handler).post(create_prediction_handler),
        )
        .route("/api/predictions/:id", delete(delete_prediction_handler))
        .route("/api/predictions/:id/note", put(update_note_handler))
        .route("/api/predictions/:id/result", put(update_result_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Request / response shapes ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MatchesQuery {
    /// yyyy-mm-dd, defaults to today
    pub from: Option<String>,
    /// yyyy-mm-dd exact day
    pub date: Option<String>,
    pub country: Option<String>,
    pub league: Option<String>,
    pub recommended: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FromQuery {
    pub from: Option<String>,
}

/// A fixture as served to clients, date in dd/mm/yyyy.
#[derive(Debug, Serialize)]
pub struct FixtureView {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub league: String,
    pub country: String,
    pub home: String,
    pub away: String,
    pub odd1: Option<f64>,
    #[serde(rename = "oddX")]
    pub odd_x: Option<f64>,
    pub odd2: Option<f64>,
    pub delta_bv: Option<f64>,
    pub recommended: bool,
}

impl From<Fixture> for FixtureView {
    fn from(f: Fixture) -> Self {
        let recommended = is_recommended(&f.prices());
        FixtureView {
            id: f.id,
            date: f.date.format(UPLOAD_DATE_FORMAT).to_string(),
            time: f.time,
            league: f.league,
            country: f.country,
            home: f.home,
            away: f.away,
            odd1: f.odd1,
            odd_x: f.odd_x,
            odd2: f.odd2,
            delta_bv: f.delta_bv,
            recommended,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub odds: MatchOdds,
    pub home: TeamForm,
    pub away: TeamForm,
    /// Stored spread for the fixture; derived from the odds when absent
    pub delta_bv: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub recommended: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePrediction {
    pub home: String,
    pub away: String,
    pub pick: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteUpdate {
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultUpdate {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionView {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub verdict: Verdict,
}

impl From<Prediction> for PredictionView {
    fn from(prediction: Prediction) -> Self {
        let verdict = grade(&prediction.pick, &prediction.result);
        PredictionView { prediction, verdict }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/matches?from=&date=&country=&league=&recommended=
pub async fn matches_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MatchesQuery>,
) -> Result<Json<Vec<FixtureView>>, ApiError> {
    let from = from_or_today(q.from.as_deref())?;
    let filter = FixtureFilter {
        date: non_blank(q.date).map(|d| parse_query_date("date", &d)).transpose()?,
        country: non_blank(q.country),
        league: non_blank(q.league),
        recommended_only: q.recommended.unwrap_or(false),
    };
    let fixtures = state.db.list_fixtures_from(from, &filter)?;
    Ok(Json(fixtures.into_iter().map(FixtureView::from).collect()))
}

/// GET /api/filters?from=
pub async fn filters_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FromQuery>,
) -> Result<Json<FilterOptions>, ApiError> {
    let from = from_or_today(q.from.as_deref())?;
    Ok(Json(state.db.filter_options(from)?))
}

/// POST /api/admin/upload-palinsesto
///
/// Replaces the whole fixture list. The admin key is checked before the
/// body is looked at.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let key = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if key != Some(state.admin_key.as_str()) {
        warn!("Rejected fixture upload with invalid admin key");
        return Err(ApiError::Unauthorized);
    }

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("body is not valid JSON: {e}")))?;
    if !value.is_array() {
        return Err(ApiError::BadRequest(
            "body must be a JSON array of fixtures".to_string(),
        ));
    }
    let uploads: Vec<FixtureUpload> = serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("invalid fixture: {e}")))?;

    let summary = state.db.replace_all_fixtures(&uploads)?;
    info!(
        "Fixture list replaced: {} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    Ok(Json(UploadResponse {
        ok: true,
        inserted: summary.inserted,
        skipped: summary.skipped,
    }))
}

/// POST /api/analyze
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload?;
    let report = analyze_with_max_goals(&req.odds, &req.home, &req.away, state.max_goals)?;
    let recommended = is_recommended(&FixturePrices::from_odds(&req.odds, req.delta_bv));
    Ok(Json(AnalyzeResponse {
        report,
        recommended,
    }))
}

/// GET /api/predictions
pub async fn list_predictions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PredictionView>>, ApiError> {
    let rows = state.db.list_predictions()?;
    Ok(Json(rows.into_iter().map(PredictionView::from).collect()))
}

/// POST /api/predictions
pub async fn create_prediction_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePrediction>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictionView>), ApiError> {
    let Json(req) = payload?;
    let (home, away, pick) = (req.home.trim(), req.away.trim(), req.pick.trim());
    if home.is_empty() || away.is_empty() || pick.is_empty() {
        return Err(ApiError::BadRequest(
            "home, away and pick are all required".to_string(),
        ));
    }
    let saved = state
        .db
        .insert_prediction(&format!("{home} - {away}"), pick)?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// PUT /api/predictions/:id/note
pub async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    if !state.db.update_prediction_note(id, req.note.trim())? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/predictions/:id/result
pub async fn update_result_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<ResultUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    if !state.db.update_prediction_result(id, req.result.trim())? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/predictions/:id
pub async fn delete_prediction_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_prediction(id)? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("no prediction with id {id}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_query_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), QUERY_DATE_FORMAT)
        .map_err(|_| ApiError::BadRequest(format!("{field} must be yyyy-mm-dd, got {raw:?}")))
}

fn from_or_today(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw.filter(|r| !r.trim().is_empty()) {
        Some(r) => parse_query_date("from", r),
        None => Ok(Local::now().date_naive()),
    }
}
