use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Run a fresh probe rather than serving the cached status.
    let status = state.realtime.perform_health_check().await;

    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        tracing::error!(overall = ?status.overall, "health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": status.overall,
            "database": status.database,
            "supabase": status.supabase,
            "system": status.system,
            "timestamp": status.timestamp,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
