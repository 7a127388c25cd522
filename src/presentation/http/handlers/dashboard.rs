//! Dashboard presentation endpoints.
//!
//! These serve simplified figures for the admin UI. Some values are
//! synthesized placeholders rather than measured aggregates; every
//! synthesized payload carries `synthetic: true` so consumers can tell
//! the two apart.

use axum::{Json, extract::State};
use rand::Rng;
use serde_json::{Value, json};

use crate::presentation::http::{errors::AppError, state::AppState};

pub async fn system_status(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let health = state.realtime.current_health().await;
    let system = state.monitor.system_report().await;
    Ok(Json(json!({
        "synthetic": false,
        "overall": health.overall,
        "uptime_secs": state.monitor.uptime().as_secs(),
        "memory_trend": system.memory_trend,
        "latest_sample": system.latest,
    })))
}

pub async fn collection_performance(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let settings = state.monitor.settings();
    Ok(Json(json!({
        "synthetic": false,
        "collections_completed": state.realtime.collection_count(),
        "collection_interval_secs": settings.collection_interval_secs,
        "system_sample_interval_secs": settings.system_sample_interval_secs,
    })))
}

/// Per-endpoint latency figures for the UI status board. The endpoint list
/// is static and the latencies are synthesized, not measured.
pub async fn api_status(State(_state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut rng = rand::thread_rng();
    let endpoints: Vec<Value> = ["meal-plans", "restaurants", "products", "recommendations"]
        .iter()
        .map(|name| {
            json!({
                "endpoint": name,
                "status": "operational",
                "latency_ms": rng.gen_range(20..180),
            })
        })
        .collect();
    Ok(Json(json!({ "synthetic": true, "endpoints": endpoints })))
}

/// Content-quality scores shown on the dashboard. Synthesized demo values
/// in a plausible range.
pub async fn quality_metrics(State(_state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut rng = rand::thread_rng();
    Ok(Json(json!({
        "synthetic": true,
        "completeness_pct": rng.gen_range(90.0..100.0f64),
        "freshness_pct": rng.gen_range(85.0..100.0f64),
        "accuracy_pct": rng.gen_range(92.0..100.0f64),
    })))
}

pub async fn recent_activity(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let entries = state.monitor.recent_activity(20).await;
    Ok(Json(json!({ "synthetic": false, "activity": entries })))
}

pub async fn error_stats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let summary = state.monitor.summary().await;
    let errors = state.monitor.recent_errors(10).await;
    Ok(Json(json!({
        "synthetic": false,
        "total_errors": summary.total_errors,
        "error_rate": summary.error_rate,
        "recent": errors,
    })))
}
