//! Report controller: the HTML form front end and the JSON report endpoint.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};

use crate::api::controller::session_credentials;
use crate::api::dto::{ApiResponse, ReportForm, ReportRequest, ReportResponse};
use crate::app_state::AppState;
use crate::config::RunPlan;
use crate::core::session::Credentials;
use crate::domain::report::{emitter, runner};
use crate::errors::AppError;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Fleet Status</title></head>
<body>
  <h1>Fleet Status Report</h1>
  <form method="post" action="/report">
    <label>Clusters (comma-separated)<br><input name="clusters" size="60"></label><br>
    <label>Namespaces (";" between clusters, "," within)<br><input name="namespaces" size="60"></label><br>
    <label>Pod name patterns (same grouping)<br><input name="patterns" size="60"></label><br>
    <label>Username<br><input name="username"></label><br>
    <label>Password<br><input name="password" type="password"></label><br>
    <button type="submit">Generate report</button>
  </form>
</body>
</html>
"#;

pub struct ReportController;

impl ReportController {
    pub async fn index() -> Html<&'static str> {
        Html(INDEX_PAGE)
    }

    /// Form submit: run the report and hand the artifact back as a download.
    pub async fn generate_form(
        State(state): State<AppState>,
        Form(form): Form<ReportForm>,
    ) -> Result<Response, AppError> {
        let plan = RunPlan::parse(&form.clusters, &form.namespaces, &form.patterns)?;
        let credentials = Credentials::new(form.username, form.password);

        let report =
            runner::run(&state.sessions, &credentials, &state.settings, &plan, None).await?;
        let csv = emitter::render(&report);

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"pods_status.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    }

    /// JSON variant: credentials come from the login session cookie.
    pub async fn generate_json(
        State(state): State<AppState>,
        headers: HeaderMap,
        Json(request): Json<ReportRequest>,
    ) -> Result<Json<ApiResponse<ReportResponse>>, AppError> {
        let credentials = session_credentials(&state, &headers).await?;
        let plan = RunPlan::parse(&request.clusters, &request.namespaces, &request.patterns)?;

        let report =
            runner::run(&state.sessions, &credentials, &state.settings, &plan, None).await?;

        Ok(Json(ApiResponse::ok(ReportResponse {
            pod_rows: report.pods.len(),
            node_rows: report.nodes.len(),
            exceptions: report.exceptions.iter().map(|e| e.line.clone()).collect(),
            csv: emitter::render(&report),
        })))
    }
}
