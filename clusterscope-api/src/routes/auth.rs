//! Login and logout handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use clusterscope_common::auth::LoginForm;

use crate::auth::SESSION_COOKIE;
use crate::middleware::auth::session_cookie;
use crate::state::AppState;

fn with_cookie(redirect: Redirect, cookie: String) -> Response {
    let mut response = redirect.into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// POST /login
pub async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    match state.auth_manager.login(&form).await {
        Ok(session) => {
            let max_age = (session.expires_at - session.created_at).num_seconds();
            with_cookie(
                Redirect::to("/"),
                format!(
                    "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                    SESSION_COOKIE, session.id, max_age
                ),
            )
        }
        Err(_) => Redirect::to("/login?error=invalid").into_response(),
    }
}

/// GET /logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_cookie(&headers) {
        state.auth_manager.logout(session_id).await;
    }

    with_cookie(
        Redirect::to("/login"),
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE),
    )
}
