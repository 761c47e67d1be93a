//! Inventory, overview and refresh handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use clusterscope_common::cluster::{ClusterOverview, RefreshResponse};
use clusterscope_common::resources::ResourcesResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/resources
pub async fn get_resources(State(state): State<Arc<AppState>>) -> Result<Json<ResourcesResponse>, ApiError> {
    let resources = state.inspector.resources().await?;
    Ok(Json(resources))
}

/// GET /api/cluster
///
/// Always 200; an unreachable cluster is reported in the `error` field.
pub async fn get_cluster(State(state): State<Arc<AppState>>) -> Json<ClusterOverview> {
    Json(state.inspector.overview().await)
}

/// POST /api/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>, ApiError> {
    let snapshot = state.inspector.refresh().await?;

    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        message: "Cluster data refreshed".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        nodes: snapshot.nodes.len(),
        pods: snapshot.pods.len(),
    }))
}
