//! Replica scaling for Deployments and StatefulSets
//!
//! A name is resolved as a Deployment first and as a StatefulSet when no
//! Deployment exists.

use clusterscope_common::cluster::{ReplicaStatus, ScaleResponse, WorkloadKind};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::api::{Api, Patch, PatchParams};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use super::classify::workloads::{deployment_desired, statefulset_desired};
use super::client::K8sClient;
use super::error::{is_not_found, K8sError, K8sResult};

/// Rejected `replicas` values in a scale request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplicasError {
    #[error("Missing replicas parameter")]
    Missing,
    #[error("Invalid replicas value - must be a number")]
    NotANumber,
    #[error("Replicas must be non-negative")]
    Negative,
}

/// Read `replicas` from a scale request body
///
/// Accepts JSON integers, whole floats and numeric strings.
pub fn parse_replicas(body: &Value) -> Result<i32, ReplicasError> {
    let value = body.get("replicas").ok_or(ReplicasError::Missing)?;

    let n: i64 = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(ReplicasError::NotANumber),
        },
        Value::String(s) => s.trim().parse().map_err(|_| ReplicasError::NotANumber)?,
        Value::Null => return Err(ReplicasError::Missing),
        _ => return Err(ReplicasError::NotANumber),
    };

    if n < 0 {
        return Err(ReplicasError::Negative);
    }
    i32::try_from(n).map_err(|_| ReplicasError::NotANumber)
}

fn not_found(namespace: &str, name: &str) -> K8sError {
    K8sError::ResourceNotFound {
        kind: "Deployment or StatefulSet".to_string(),
        name: name.to_string(),
        namespace: namespace.to_string(),
    }
}

/// Set `spec.replicas` on the named Deployment or StatefulSet
pub async fn scale_workload(
    client: &K8sClient,
    namespace: &str,
    name: &str,
    replicas: i32,
) -> K8sResult<ScaleResponse> {
    let patch = json!({"spec": {"replicas": replicas}});
    let params = PatchParams::default();

    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    let kind = match deployments.patch(name, &params, &Patch::Merge(&patch)).await {
        Ok(_) => WorkloadKind::Deployment,
        Err(e) if is_not_found(&e) => {
            let statefulsets: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
            match statefulsets.patch(name, &params, &Patch::Merge(&patch)).await {
                Ok(_) => WorkloadKind::StatefulSet,
                Err(e) if is_not_found(&e) => return Err(not_found(namespace, name)),
                Err(e) => return Err(e.into()),
            }
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        kind = %kind,
        namespace = %namespace,
        name = %name,
        replicas,
        "Scaled workload"
    );

    Ok(ScaleResponse {
        success: true,
        message: format!("{} {} scaled to {} replicas", kind, name, replicas),
        deployment: name.to_string(),
        namespace: namespace.to_string(),
        replicas,
        kind,
    })
}

pub fn deployment_replicas(deployment: &Deployment, namespace: &str, name: &str) -> ReplicaStatus {
    let status = deployment.status.as_ref();
    ReplicaStatus {
        deployment: name.to_string(),
        namespace: namespace.to_string(),
        kind: WorkloadKind::Deployment,
        desired_replicas: deployment_desired(deployment),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        unavailable_replicas: Some(status.and_then(|s| s.unavailable_replicas).unwrap_or(0)),
        current_replicas: None,
    }
}

/// StatefulSets have no separate available count; ready is reported for both
pub fn statefulset_replicas(statefulset: &StatefulSet, namespace: &str, name: &str) -> ReplicaStatus {
    let status = statefulset.status.as_ref();
    let ready = status.and_then(|s| s.ready_replicas).unwrap_or(0);
    ReplicaStatus {
        deployment: name.to_string(),
        namespace: namespace.to_string(),
        kind: WorkloadKind::StatefulSet,
        desired_replicas: statefulset_desired(statefulset),
        ready_replicas: ready,
        available_replicas: ready,
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        unavailable_replicas: None,
        current_replicas: Some(status.and_then(|s| s.current_replicas).unwrap_or(0)),
    }
}

/// Current replica counts of the named Deployment or StatefulSet
pub async fn replica_status(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<ReplicaStatus> {
    let deployments: Api<Deployment> = Api::namespaced(client.inner().clone(), namespace);
    if let Some(deployment) = deployments.get_opt(name).await? {
        return Ok(deployment_replicas(&deployment, namespace, name));
    }

    let statefulsets: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    match statefulsets.get_opt(name).await? {
        Some(statefulset) => Ok(statefulset_replicas(&statefulset, namespace, name)),
        None => Err(not_found(namespace, name)),
    }
}
