//! Session middleware
//!
//! Guards dashboard pages and API routes behind the login session cookie.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::auth::SESSION_COOKIE;
use crate::state::AppState;

/// Body of the 401 returned to unauthenticated API calls
#[derive(Serialize)]
pub struct AuthError {
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Value of the session cookie, if the request carries one
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Reject requests without a live session
///
/// `/api/*` gets a JSON 401; pages redirect to the login form. The session is
/// attached to the request extensions for downstream handlers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.auth_manager.is_enabled() {
        return next.run(request).await;
    }

    let session_id = session_cookie(request.headers()).map(str::to_owned);
    if let Some(session_id) = session_id {
        if let Ok(session) = state.auth_manager.validate(&session_id).await {
            request.extensions_mut().insert(session);
            return next.run(request).await;
        }
    }

    let path = request.uri().path();
    debug!(path, "Unauthenticated request");

    if path.starts_with("/api/") {
        AuthError {
            error: "Authentication required".to_string(),
        }
        .into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; clusterscope_session=abc-123; other=1"),
        );

        assert_eq!(session_cookie(&headers), Some("abc-123"));
    }

    #[test]
    fn test_session_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("clusterscope_session=xyz"));

        assert_eq!(session_cookie(&headers), Some("xyz"));
    }

    #[test]
    fn test_missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_cookie(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("clusterscope_session="));
        assert!(session_cookie(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("clusterscope_session_old=1"));
        assert!(session_cookie(&headers).is_none());
    }
}
