//! Controllers: connect routes to session and collection logic.

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::core::session::Credentials;
use crate::errors::AppError;

pub mod cluster_controller;
pub mod report_controller;

pub const SESSION_COOKIE: &str = "fleetstatus_session";

/// Resolve the caller's credentials from the session cookie set by login.
pub async fn session_credentials(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Credentials, AppError> {
    let token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(cookie_token)
        .ok_or_else(|| AppError::Auth("missing session cookie, call login first".to_string()))?;

    state
        .web_sessions
        .get(&token)
        .await
        .ok_or_else(|| AppError::Auth("unknown or expired session".to_string()))
}

fn cookie_token(cookie_header: &str) -> Option<Uuid> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_extracted_among_other_cookies() {
        let id = Uuid::new_v4();
        let header = format!("theme=dark; {SESSION_COOKIE}={id}; lang=en");
        assert_eq!(cookie_token(&header), Some(id));
    }

    #[test]
    fn malformed_or_missing_cookie_yields_none() {
        assert_eq!(cookie_token("theme=dark"), None);
        assert_eq!(cookie_token(&format!("{SESSION_COOKIE}=not-a-uuid")), None);
        assert_eq!(cookie_token(""), None);
    }
}
