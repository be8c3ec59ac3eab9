//! Request/response shapes for the HTTP surface.

use serde::{Deserialize, Serialize};

/// Uniform success envelope for JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// JSON body for a report run. List arguments use the same grammar as the
/// CLI: clusters comma-separated, namespace/pattern groups semicolon-separated.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub clusters: String,
    pub namespaces: String,
    pub patterns: String,
}

/// HTML-form variant of [`ReportRequest`], carrying credentials inline so the
/// form works without a prior login call.
#[derive(Debug, Deserialize)]
pub struct ReportForm {
    pub clusters: String,
    pub namespaces: String,
    pub patterns: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub pod_rows: usize,
    pub node_rows: usize,
    pub exceptions: Vec<String>,
    /// The same semicolon-delimited artifact the CLI writes to disk.
    pub csv: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
}

/// Command to run inside a pod, argv-style.
#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    pub command: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecResponse {
    pub output: String,
}
