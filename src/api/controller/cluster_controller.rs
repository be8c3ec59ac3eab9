//! Cluster controller: login plus ad-hoc pod/PVC operations against one
//! cluster, authenticated through the session cookie.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::api::controller::{session_credentials, SESSION_COOKIE};
use crate::api::dto::{ApiResponse, ExecRequest, ExecResponse, LoginRequest, LoginResponse};
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::core::client::pods::{delete_pod, exec_in_pod, fetch_pod_logs, fetch_pods_by_namespace};
use crate::core::client::storage::fetch_persistent_volume_claims_by_namespace;
use crate::core::session::Credentials;
use crate::errors::AppError;

pub struct ClusterController;

impl ClusterController {
    /// Store credentials in the in-memory session map and hand back the
    /// opaque cookie. No cluster is contacted here; the first real call
    /// will surface bad credentials as a 401.
    pub async fn login(
        State(state): State<AppState>,
        Json(request): Json<LoginRequest>,
    ) -> Result<impl IntoResponse, AppError> {
        let username = request.username.clone();
        let token = state
            .web_sessions
            .insert(Credentials::new(request.username, request.password))
            .await;

        Ok((
            StatusCode::OK,
            [(
                header::SET_COOKIE,
                format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/"),
            )],
            Json(ApiResponse::ok(LoginResponse { username })),
        ))
    }

    pub async fn list_pods(
        State(state): State<AppState>,
        headers: HeaderMap,
        Path((cluster, namespace)): Path<(String, String)>,
    ) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let client = state.sessions.ensure_active(&cluster, &credentials).await?;

        to_json(
            fetch_pods_by_namespace(&client, &namespace)
                .await
                .map(|pods| {
                    pods.into_iter()
                        .filter_map(|p| p.metadata.name)
                        .collect::<Vec<_>>()
                }),
        )
    }

    /// Raw log dump, as plain text rather than the JSON envelope.
    pub async fn pod_logs(
        State(state): State<AppState>,
        headers: HeaderMap,
        Path((cluster, namespace, pod)): Path<(String, String, String)>,
    ) -> Result<String, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let client = state.sessions.ensure_active(&cluster, &credentials).await?;

        fetch_pod_logs(&client, &namespace, &pod)
            .await
            .map_err(|e| AppError::ExternalCall(format!("{e:#}")))
    }

    pub async fn delete_pod(
        State(state): State<AppState>,
        headers: HeaderMap,
        Path((cluster, namespace, pod)): Path<(String, String, String)>,
    ) -> Result<Json<ApiResponse<String>>, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let client = state.sessions.ensure_active(&cluster, &credentials).await?;

        delete_pod(&client, &namespace, &pod)
            .await
            .map_err(|e| AppError::ExternalCall(format!("{e:#}")))?;
        Ok(Json(ApiResponse::ok(format!(
            "pod {namespace}/{pod} deleted"
        ))))
    }

    /// Run a short command inside the pod and return its stdout. Used as a
    /// connectivity probe from the web surface.
    pub async fn exec(
        State(state): State<AppState>,
        headers: HeaderMap,
        Path((cluster, namespace, pod)): Path<(String, String, String)>,
        Json(request): Json<ExecRequest>,
    ) -> Result<Json<ApiResponse<ExecResponse>>, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let client = state.sessions.ensure_active(&cluster, &credentials).await?;

        let output = exec_in_pod(&client, &namespace, &pod, request.command)
            .await
            .map_err(|e| AppError::ExternalCall(format!("{e:#}")))?;
        Ok(Json(ApiResponse::ok(ExecResponse { output })))
    }

    pub async fn list_pvcs(
        State(state): State<AppState>,
        headers: HeaderMap,
        Path((cluster, namespace)): Path<(String, String)>,
    ) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let client = state.sessions.ensure_active(&cluster, &credentials).await?;

        to_json(
            fetch_persistent_volume_claims_by_namespace(&client, &namespace)
                .await
                .map(|pvcs| {
                    pvcs.into_iter()
                        .filter_map(|p| p.metadata.name)
                        .collect::<Vec<_>>()
                }),
        )
    }
}
