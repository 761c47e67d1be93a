//! Scale and replica handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use clusterscope_common::cluster::{ReplicaStatus, ScaleResponse};
use serde_json::Value;

use crate::error::ApiError;
use crate::kubernetes::scaling::{parse_replicas, ReplicasError};
use crate::state::AppState;

impl From<ReplicasError> for ApiError {
    fn from(err: ReplicasError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// POST /api/deployments/:namespace/:name/scale
///
/// The body is read raw so a missing or malformed payload reports the
/// missing parameter rather than a content-type rejection.
pub async fn scale(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ScaleResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let replicas = parse_replicas(&payload)?;

    let response = state.inspector.scale(&namespace, &name, replicas).await?;
    Ok(Json(response))
}

/// GET /api/deployments/:namespace/:name/replicas
pub async fn replicas(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ReplicaStatus>, ApiError> {
    let status = state.inspector.replica_status(&namespace, &name).await?;
    Ok(Json(status))
}
