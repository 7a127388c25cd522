//! Operator and test trigger endpoints.

use std::time::Duration;

use axum::{Json, extract::State};
use rand::Rng;
use serde_json::{Value, json};

use crate::presentation::http::{errors::AppError, state::AppState};

/// Synthesizes a burst of query metrics and one activity record so a
/// fresh deployment has something on the dashboard.
pub async fn generate_metrics(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let operations = ["fetch_meal_plans", "search_restaurants", "list_products"];
    let mut generated = 0;
    for op in operations {
        let samples = rand::thread_rng().gen_range(3..8);
        for _ in 0..samples {
            let duration = Duration::from_millis(rand::thread_rng().gen_range(5..400));
            let success = rand::thread_rng().gen_bool(0.9);
            state
                .monitor
                .record_query_metrics(op, duration, success, None, (!success).then_some("synthetic failure"))
                .await;
            generated += 1;
        }
    }
    state
        .monitor
        .track_user_activity(None, "synthetic_visit", Some(json!({"source": "test"})))
        .await;
    Ok(Json(json!({ "generated": generated, "synthetic": true })))
}

pub async fn trigger_collection(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.realtime.collect_realtime_metrics().await;
    Ok(Json(json!({
        "triggered": true,
        "collections_completed": state.realtime.collection_count(),
    })))
}

/// There is no circuit breaker in this service; the endpoint exists for
/// dashboard compatibility and says so.
pub async fn reset_circuit_breakers(
    State(_state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "reset": true,
        "mocked": true,
        "message": "no circuit breakers are configured in this service",
    })))
}

pub async fn clear_alerts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let cleared = state.monitor.clear_alerts().await;
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn test_alert(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state
        .realtime
        .raise_test_alert("manually triggered test alert")
        .await;
    Ok(Json(json!({ "raised": true })))
}
