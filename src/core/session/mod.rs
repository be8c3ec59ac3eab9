//! Cluster sessions: one explicit `kube::Client` handle per cluster.
//!
//! The historical scripts relied on a single ambient "current context"
//! switched before every call; here every collector receives its own client,
//! which also makes per-cluster work safe to parallelize later.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use kube::{Client, Config};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::errors::AppError;

/// Username/password pair reused for every cluster login. The password never
/// appears in Debug output or log lines.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Caches an authenticated client per cluster name and re-establishes it
/// when the identity probe fails.
pub struct SessionManager {
    settings: Arc<Settings>,
    clients: RwLock<HashMap<String, Client>>,
}

impl SessionManager {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a working client for `cluster`, logging in if the cached one
    /// is missing or its identity probe fails.
    pub async fn ensure_active(
        &self,
        cluster: &str,
        credentials: &Credentials,
    ) -> Result<Client, AppError> {
        if let Some(client) = self.clients.read().await.get(cluster).cloned() {
            if client.apiserver_version().await.is_ok() {
                debug!("Reusing active session for cluster '{}'", cluster);
                return Ok(client);
            }
            warn!("Session probe failed for cluster '{}', logging in again", cluster);
        }

        let client = self
            .login(cluster, credentials)
            .await
            .map_err(|e| AppError::Auth(format!("cluster '{cluster}': {e:#}")))?;

        self.clients
            .write()
            .await
            .insert(cluster.to_string(), client.clone());
        info!("Connected to cluster '{}'", cluster);
        Ok(client)
    }

    async fn login(&self, cluster: &str, credentials: &Credentials) -> Result<Client> {
        let api_url = self.settings.api_url(cluster);
        let token = request_oauth_token(&api_url, credentials, self.settings.insecure_tls)
            .await
            .context("token exchange failed")?;

        let uri: http::Uri = api_url.parse().context("invalid cluster API URL")?;
        let mut config = Config::new(uri);
        // Mirrors the original --insecure-skip-tls-verify login; settable
        // off via FLEETSTATUS_INSECURE_TLS=false.
        config.accept_invalid_certs = self.settings.insecure_tls;
        config.auth_info.token = Some(SecretString::from(token));

        let client = Client::try_from(config).context("building cluster client")?;
        client
            .apiserver_version()
            .await
            .context("identity probe after login")?;
        Ok(client)
    }
}

/// OAuth password-for-token exchange against the challenging client endpoint.
/// The token travels back in the fragment of a redirect Location header.
async fn request_oauth_token(
    api_url: &str,
    credentials: &Credentials,
    insecure_tls: bool,
) -> Result<String> {
    let http = reqwest::Client::builder()
        .danger_accept_invalid_certs(insecure_tls)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let mut url = format!(
        "{api_url}/oauth/authorize?client_id=openshift-challenging-client&response_type=token"
    );
    for _ in 0..5 {
        let response = http
            .get(&url)
            .basic_auth(&credentials.username, Some(credentials.password()))
            .header("X-CSRF-Token", "1")
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| anyhow!("redirect without Location header"))?;
            if let Some(token) = extract_access_token(location) {
                return Ok(token);
            }
            url = location.to_string();
            continue;
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            bail!("invalid credentials for user '{}'", credentials.username);
        }
        bail!("unexpected status {status} during login");
    }
    bail!("login redirect chain did not yield a token")
}

/// Pulls `access_token` out of a redirect fragment like
/// `.../oauth/token/implicit#access_token=sha256~abc&expires_in=86400`.
fn extract_access_token(location: &str) -> Option<String> {
    let fragment = location.split_once('#')?.1;
    fragment
        .split('&')
        .find_map(|pair| pair.strip_prefix("access_token="))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// In-memory web sessions: opaque token in a cookie, credentials held only
/// for the lifetime of the process.
#[derive(Default)]
pub struct WebSessions {
    inner: RwLock<HashMap<Uuid, Credentials>>,
}

impl WebSessions {
    pub async fn insert(&self, credentials: Credentials) -> Uuid {
        let token = Uuid::new_v4();
        self.inner.write().await.insert(token, credentials);
        token
    }

    pub async fn get(&self, token: &Uuid) -> Option<Credentials> {
        self.inner.read().await.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_comes_from_fragment() {
        let loc = "https://oauth.example/token/implicit#access_token=sha256~abc123&expires_in=86400";
        assert_eq!(extract_access_token(loc).as_deref(), Some("sha256~abc123"));
        assert_eq!(extract_access_token("https://oauth.example/login"), None);
        assert_eq!(extract_access_token("https://x/#expires_in=3600"), None);
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("ops", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ops"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn web_sessions_round_trip() {
        let sessions = WebSessions::default();
        let token = sessions.insert(Credentials::new("ops", "pw")).await;
        let found = sessions.get(&token).await.unwrap();
        assert_eq!(found.username, "ops");
        assert!(sessions.get(&Uuid::new_v4()).await.is_none());
    }
}
