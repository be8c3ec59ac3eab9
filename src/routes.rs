use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::controller::report_controller::ReportController;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router() -> Router<AppState> {
    // Report and cluster subrouters live under /api/v1
    let api_v1 = Router::new()
        .merge(crate::api::routes::report_routes::report_routes())
        .merge(crate::api::routes::cluster_routes::cluster_routes());

    Router::new()
        // HTML front end
        .route("/", get(ReportController::index))
        .route("/report", post(ReportController::generate_form))
        // Health check
        .route("/health", get(health_check))
        // API v1
        .nest("/api/v1", api_v1)
        // Fallback handler for 404
        .fallback(handler_404)
        .layer(CorsLayer::very_permissive())
}

// Handler for health check
async fn health_check() -> &'static str {
    "OK"
}

// Handler for 404 Not Found
async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
