//! Cluster routes (e.g., /api/v1/clusters/*)

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::controller::cluster_controller::ClusterController;
use crate::app_state::AppState;

pub fn cluster_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(ClusterController::login))
        .route(
            "/clusters/{cluster}/namespaces/{namespace}/pods",
            get(ClusterController::list_pods),
        )
        .route(
            "/clusters/{cluster}/namespaces/{namespace}/pods/{pod}/logs",
            get(ClusterController::pod_logs),
        )
        .route(
            "/clusters/{cluster}/namespaces/{namespace}/pods/{pod}",
            delete(ClusterController::delete_pod),
        )
        .route(
            "/clusters/{cluster}/namespaces/{namespace}/pods/{pod}/exec",
            post(ClusterController::exec),
        )
        .route(
            "/clusters/{cluster}/namespaces/{namespace}/pvcs",
            get(ClusterController::list_pvcs),
        )
}
