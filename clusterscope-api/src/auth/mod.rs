//! Dashboard authentication
//!
//! A single configured account; credentials are compared in constant time
//! and successful logins get a server-side session.

pub mod session;

use chrono::{DateTime, Utc};
use clusterscope_common::auth::{LoginForm, Session};
use clusterscope_common::{Error, Result};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::config::AuthConfig;
use session::SessionStore;

/// Session cookie set on login
pub const SESSION_COOKIE: &str = "clusterscope_session";

/// One year
const MAX_SESSION_HOURS: i64 = 24 * 365;

pub struct AuthManager {
    enabled: bool,
    username: String,
    password: String,
    sessions: SessionStore,
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        if config.enabled && config.uses_default_credentials() {
            warn!("Dashboard is using the default credentials; set CLUSTERSCOPE_USERNAME and CLUSTERSCOPE_PASSWORD");
        }

        let hours = i64::try_from(config.session_timeout_hours)
            .unwrap_or(MAX_SESSION_HOURS)
            .min(MAX_SESSION_HOURS);

        Self {
            enabled: config.enabled,
            username: config.username.clone(),
            password: config.password.clone(),
            sessions: SessionStore::new(chrono::Duration::hours(hours)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check credentials and open a session
    pub async fn login(&self, form: &LoginForm) -> Result<Session> {
        // Both comparisons always run
        let user_ok = constant_time_eq(&form.username, &self.username);
        let pass_ok = constant_time_eq(&form.password, &self.password);

        if !(user_ok & pass_ok) {
            warn!(username = %form.username, "Dashboard login failed");
            return Err(Error::AuthenticationFailed);
        }

        let session = self.sessions.create(&form.username, Utc::now()).await;
        info!(username = %session.username, "Dashboard login");
        Ok(session)
    }

    /// Session for `session_id` if it exists and has not expired
    pub async fn validate(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .get(session_id, Utc::now())
            .await
            .ok_or(Error::InvalidSession)
    }

    pub async fn logout(&self, session_id: &str) {
        if self.sessions.remove(session_id).await {
            info!("Dashboard logout");
        }
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.sessions.purge_expired(now).await
    }
}
