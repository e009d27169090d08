use crate::analysis;
use crate::calculator;
use crate::config::Config;
use crate::db::{self, CarbonEntry, Database};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/entries", get(entries_list).post(entries_create))
        .route("/api/v1/entries/daily-totals", get(entries_daily_totals))
        .route("/api/v1/entries/breakdown", get(entries_breakdown))
        .route("/api/v1/entries/:id", axum::routing::delete(entries_delete))
        .route("/api/v1/analysis", get(analysis_run))
        .route("/api/v1/analysis/history", get(analysis_history))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    owner: Option<String>,
    days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    owner: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EntryPayload {
    activity_type: String,
    activity_value: f64,
    unit: String,
}

#[derive(Debug, Serialize)]
struct EntriesPayload {
    owner: String,
    days: u32,
    count: usize,
    entries: Vec<CarbonEntry>,
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    db_path: String,
    api_port: u16,
    default_owner: String,
    entry_count: i64,
    last_entry_at: Option<i64>,
}

fn resolve_owner(state: &ApiState, owner: Option<String>) -> String {
    owner
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| state.config.default_owner.clone())
}

async fn status(
    State(state): State<ApiState>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<StatusPayload>> {
    let owner = resolve_owner(&state, query.owner);
    let database = Database::open(&state.config.db_path)?;

    let payload = StatusPayload {
        db_path: state.config.db_path.display().to_string(),
        api_port: state.config.api_port,
        default_owner: state.config.default_owner.clone(),
        entry_count: database.entry_count(&owner)?,
        last_entry_at: database.latest_entry_timestamp(&owner)?,
    };

    Ok(Json(payload))
}

async fn entries_create(
    State(state): State<ApiState>,
    Query(query): Query<OwnerQuery>,
    Json(payload): Json<EntryPayload>,
) -> ApiResult<Json<CarbonEntry>> {
    if !payload.activity_value.is_finite() || payload.activity_value <= 0.0 {
        return Err(ApiError::BadRequest(
            "activity_value must be a positive number".to_string(),
        ));
    }

    let owner = resolve_owner(&state, query.owner);
    let estimate = calculator::calculate(
        &payload.activity_type,
        payload.activity_value,
        &payload.unit,
    );

    let database = Database::open(&state.config.db_path)?;
    let entry = database.insert_entry(
        &owner,
        &payload.activity_type,
        payload.activity_value,
        &payload.unit,
        estimate.calculated_co2,
        estimate.category,
        Utc::now().timestamp(),
    )?;

    Ok(Json(entry))
}

async fn entries_list(
    State(state): State<ApiState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<EntriesPayload>> {
    let owner = resolve_owner(&state, query.owner);
    let days = query.days.unwrap_or(7).clamp(1, 365);

    let database = Database::open(&state.config.db_path)?;
    let entries = database.entries_since(&owner, db::window_start_ts(days))?;

    Ok(Json(EntriesPayload {
        owner,
        days,
        count: entries.len(),
        entries,
    }))
}

async fn entries_delete(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let owner = resolve_owner(&state, query.owner);
    let database = Database::open(&state.config.db_path)?;

    if !database.delete_entry(&owner, id)? {
        return Err(ApiError::NotFound(format!("No entry with id {id}")));
    }

    Ok(Json(json!({ "deleted": true, "id": id })))
}

async fn entries_daily_totals(
    State(state): State<ApiState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let owner = resolve_owner(&state, query.owner);
    let days = query.days.unwrap_or(7).clamp(1, 365);

    let database = Database::open(&state.config.db_path)?;
    let totals = database.daily_totals(&owner, days)?;

    Ok(Json(json!({ "owner": owner, "days": days, "daily_totals": totals })))
}

async fn entries_breakdown(
    State(state): State<ApiState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let owner = resolve_owner(&state, query.owner);
    let days = query.days.unwrap_or(7).clamp(1, 365);

    let database = Database::open(&state.config.db_path)?;
    let breakdown = database.category_breakdown(&owner, days)?;

    Ok(Json(json!({
        "owner": owner,
        "days": days,
        "breakdown": breakdown.categories,
        "total": breakdown.total
    })))
}

async fn analysis_run(
    State(state): State<ApiState>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<analysis::AnalysisReport>> {
    let owner = resolve_owner(&state, query.owner);
    let database = Database::open(&state.config.db_path)?;

    let report = analysis::run_analysis(&database, &owner, &mut rand::thread_rng())?;

    Ok(Json(report))
}

async fn analysis_history(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let owner = resolve_owner(&state, query.owner);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let database = Database::open(&state.config.db_path)?;
    let history = database.list_analysis_history(&owner, limit)?;

    Ok(Json(json!({ "owner": owner, "history": history })))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}
