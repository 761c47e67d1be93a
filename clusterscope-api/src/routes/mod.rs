//! HTTP routes
//!
//! Public: health, login/logout and static assets. Everything else sits
//! behind the session middleware.

pub mod auth;
pub mod health;
pub mod inventory;
pub mod workloads;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, get_service, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::require_session;
use crate::state::AppState;

/// Dashboard pages and the resource/cluster API
fn protected_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let static_dir = &state.config.ui.static_dir;

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/resources", ServeFile::new(static_dir.join("resources.html")))
        .route("/api/resources", get(inventory::get_resources))
        .route("/api/cluster", get(inventory::get_cluster))
        .route("/api/refresh", post(inventory::refresh))
        .route("/api/deployments/:namespace/:name/scale", post(workloads::scale))
        .route("/api/deployments/:namespace/:name/replicas", get(workloads::replicas))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(state),
            require_session,
        ))
}

fn public_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let static_dir = &state.config.ui.static_dir;

    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/login",
            get_service(ServeFile::new(static_dir.join("login.html"))).post(auth::login),
        )
        .route("/logout", get(auth::logout))
        .nest_service("/static", ServeDir::new(static_dir))
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public_routes(&state))
        .merge(protected_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
