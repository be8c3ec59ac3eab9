use std::sync::Arc;

use crate::config::Settings;
use crate::core::session::{SessionManager, WebSessions};

/// Shared state for the HTTP surface: settings plus the two session maps
/// (cluster clients and web login cookies).
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub web_sessions: Arc<WebSessions>,
}

pub fn build_app_state(settings: Settings) -> AppState {
    let settings = Arc::new(settings);
    AppState {
        sessions: Arc::new(SessionManager::new(settings.clone())),
        web_sessions: Arc::new(WebSessions::default()),
        settings,
    }
}
