//! Report routes (e.g., /api/v1/report)

use axum::{routing::post, Router};

use crate::api::controller::report_controller::ReportController;
use crate::app_state::AppState;

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/report", post(ReportController::generate_json))
}
