//! Read-only views over the monitor and realtime system state.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::presentation::http::{errors::AppError, state::AppState};

const MAX_HISTORY_DAYS: u32 = 30;
const MAX_ERRORS_LIMIT: usize = 1000;

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let dashboard = state.realtime.get_dashboard_data().await;
    Ok(Json(json!(dashboard)))
}

pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let report = state.monitor.generate_report().await;
    Ok(Json(json!(report)))
}

#[derive(Debug, Deserialize)]
pub struct HistoricalParams {
    pub days: Option<u32>,
}

pub async fn get_historical_metrics(
    State(state): State<AppState>,
    Query(params): Query<HistoricalParams>,
) -> Result<Json<Value>, AppError> {
    let days = params.days.unwrap_or(7);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }
    let records = state.realtime.get_historical_metrics(days).await;
    Ok(Json(json!({ "days": days, "count": records.len(), "records": records })))
}

pub async fn get_report(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let report = state.realtime.generate_monitoring_report().await;
    Ok(Json(json!(report)))
}

pub async fn get_queries(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let queries = state.monitor.query_reports().await;
    Ok(Json(json!({ "queries": queries })))
}

#[derive(Debug, Deserialize)]
pub struct ErrorsParams {
    pub limit: Option<usize>,
}

pub async fn get_errors(
    State(state): State<AppState>,
    Query(params): Query<ErrorsParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(50).min(MAX_ERRORS_LIMIT);
    let errors = state.monitor.recent_errors(limit).await;
    Ok(Json(json!({ "count": errors.len(), "errors": errors })))
}

pub async fn get_activity(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let summary = state.monitor.activity_summary().await;
    Ok(Json(json!(summary)))
}

pub async fn get_system(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let system = state.monitor.system_report().await;
    Ok(Json(json!(system)))
}

pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let alerts = state.monitor.alerts().await;
    Ok(Json(json!({ "count": alerts.len(), "alerts": alerts })))
}

/// Effective monitoring settings after defaults and file overrides.
pub async fn get_config(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.monitor.settings())))
}
