use super::{
    handlers::{dashboard, health, metrics, realtime, testing, ws},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    let test_routes = Router::new()
        .route(
            "/api/v1/monitoring/test/generate-metrics",
            post(testing::generate_metrics),
        )
        .route(
            "/api/v1/monitoring/test/trigger-collection",
            post(testing::trigger_collection),
        )
        .route(
            "/api/v1/monitoring/test/reset-circuit-breakers",
            post(testing::reset_circuit_breakers),
        )
        .route(
            "/api/v1/monitoring/test/clear-alerts",
            post(testing::clear_alerts),
        )
        .route(
            "/api/v1/monitoring/test/test-alert",
            post(testing::test_alert),
        );

    // Presentation figures for the admin UI; some are synthesized and
    // flagged as such in the payload.
    let dashboard_routes = Router::new()
        .route(
            "/api/v1/monitoring/dashboard/system-status",
            get(dashboard::system_status),
        )
        .route(
            "/api/v1/monitoring/dashboard/collection-performance",
            get(dashboard::collection_performance),
        )
        .route(
            "/api/v1/monitoring/dashboard/api-status",
            get(dashboard::api_status),
        )
        .route(
            "/api/v1/monitoring/dashboard/quality-metrics",
            get(dashboard::quality_metrics),
        )
        .route(
            "/api/v1/monitoring/dashboard/recent-activity",
            get(dashboard::recent_activity),
        )
        .route(
            "/api/v1/monitoring/dashboard/error-stats",
            get(dashboard::error_stats),
        );

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Monitoring reads
        .route("/api/v1/monitoring/dashboard", get(metrics::get_dashboard))
        .route("/api/v1/monitoring/metrics", get(metrics::get_metrics))
        .route(
            "/api/v1/monitoring/metrics/historical",
            get(metrics::get_historical_metrics),
        )
        .route("/api/v1/monitoring/report", get(metrics::get_report))
        .route("/api/v1/monitoring/queries", get(metrics::get_queries))
        .route("/api/v1/monitoring/errors", get(metrics::get_errors))
        .route("/api/v1/monitoring/activity", get(metrics::get_activity))
        .route("/api/v1/monitoring/system", get(metrics::get_system))
        .route("/api/v1/monitoring/alerts", get(metrics::get_alerts))
        .route("/api/v1/monitoring/config", get(metrics::get_config))
        // Push surfaces
        .route("/api/v1/monitoring/realtime", get(realtime::realtime_stream))
        .route("/ws/monitoring", get(ws::ws_handler))
        .merge(test_routes)
        .merge(dashboard_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
