//! HTTP surface. Each handler loads the CSVs it needs on a blocking worker,
//! runs the pipeline and serializes the result; nothing is cached between
//! requests.

use crate::breakdown::expenditure_breakdown;
use crate::config::{DataPaths, DEFAULT_VISITOR_MAP_YEAR, DEFAULT_YEAR};
use crate::countries::CountryRegistry;
use crate::error::{ReportError, Result};
use crate::monthly::{japan_monthly, korea_monthly};
use crate::reports::{
    world_avg_spending_map, world_crowd_score_map, world_expenditure_map, world_visitor_map,
    METRIC_AVG_SPENDING, METRIC_CROWD_SCORE, METRIC_EXPENDITURE, METRIC_TOURIST_COUNT,
};
use crate::types::{BreakdownResponse, MapData, MapResponse, MonthlyResponse};
use crate::util::parse_i32_safe;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<DataPaths>,
    pub registry: &'static CountryRegistry,
}

impl AppState {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths: Arc::new(paths),
            registry: CountryRegistry::standard(),
        }
    }
}

/// `?year=` is optional and parsed leniently: anything that is not an
/// integer falls back to the endpoint default.
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

impl YearQuery {
    pub fn year(&self) -> Option<i32> {
        parse_i32_safe(self.year.as_deref())
    }
}

/// Map endpoints answer "no data" with the error body plus an empty
/// `data` envelope.
pub struct MapError {
    year: i32,
    metric: &'static str,
    error: ReportError,
}

impl IntoResponse for MapError {
    fn into_response(self) -> Response {
        if !self.error.is_not_found() {
            return self.error.into_response();
        }
        let mut body = self.error.body();
        body["year"] = json!(self.year);
        body["metric"] = json!(self.metric);
        body["data"] = json!(MapData::default());
        tracing::info!(metric = self.metric, error = %self.error, "no data for request");
        (self.error.status(), Json(body)).into_response()
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ReportError::Internal(e.to_string()))?
}

async fn map_metric<F>(
    state: AppState,
    year: i32,
    metric: &'static str,
    compute: F,
) -> std::result::Result<Json<MapResponse>, MapError>
where
    F: FnOnce(&DataPaths, &CountryRegistry, i32) -> Result<MapResponse> + Send + 'static,
{
    run_blocking(move || compute(state.paths.as_ref(), state.registry, year))
        .await
        .map(Json)
        .map_err(|error| MapError {
            year,
            metric,
            error,
        })
}

pub async fn world_map_data(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> std::result::Result<Json<MapResponse>, MapError> {
    let year = q.year().unwrap_or(DEFAULT_VISITOR_MAP_YEAR);
    map_metric(state, year, METRIC_TOURIST_COUNT, world_visitor_map).await
}

pub async fn world_map_expenditure(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> std::result::Result<Json<MapResponse>, MapError> {
    let year = q.year().unwrap_or(DEFAULT_YEAR);
    map_metric(state, year, METRIC_EXPENDITURE, world_expenditure_map).await
}

pub async fn world_map_avg_spending(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> std::result::Result<Json<MapResponse>, MapError> {
    let year = q.year().unwrap_or(DEFAULT_YEAR);
    map_metric(state, year, METRIC_AVG_SPENDING, world_avg_spending_map).await
}

pub async fn world_map_crowd_score(
    State(state): State<AppState>,
    Query(q): Query<YearQuery>,
) -> std::result::Result<Json<MapResponse>, MapError> {
    let year = q.year().unwrap_or(DEFAULT_YEAR);
    map_metric(state, year, METRIC_CROWD_SCORE, world_crowd_score_map).await
}

/// Only Japan and Korea publish monthly files.
pub async fn monthly_visitors(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(q): Query<YearQuery>,
) -> Result<Json<MonthlyResponse>> {
    let year = q.year();
    let paths = state.paths.clone();
    let job: fn(&DataPaths, Option<i32>) -> Result<MonthlyResponse> =
        match code.trim().to_uppercase().as_str() {
            "JPN" => japan_monthly,
            "KOR" => korea_monthly,
            _ => return Err(ReportError::UnknownCountry { code }),
        };
    run_blocking(move || job(paths.as_ref(), year)).await.map(Json)
}

pub async fn country_expenditure_breakdown(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(q): Query<YearQuery>,
) -> Result<Json<BreakdownResponse>> {
    let year = q.year().unwrap_or(DEFAULT_YEAR);
    let code = code.trim().to_uppercase();
    run_blocking(move || expenditure_breakdown(state.paths.as_ref(), state.registry, &code, year))
        .await
        .map(Json)
}

pub async fn healthy() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/world-map-data", get(world_map_data))
        .route("/world-map-expenditure", get(world_map_expenditure))
        .route("/world-map-avg-spending", get(world_map_avg_spending))
        .route("/world-map-crowd-score", get(world_map_crowd_score))
        .route("/country/:code/monthly-visitors", get(monthly_visitors))
        .route(
            "/country/:code/expenditure-breakdown",
            get(country_expenditure_breakdown),
        )
        .route("/healthy", get(healthy))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
