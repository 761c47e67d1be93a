//! Workload rules

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};

/// Desired replicas, treating an absent count as zero
pub fn deployment_desired(deployment: &Deployment) -> i32 {
    deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(0)
}

pub fn statefulset_desired(statefulset: &StatefulSet) -> i32 {
    statefulset
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(0)
}

/// A Deployment scaled to zero serves nothing
pub fn is_deployment_orphaned(deployment: &Deployment) -> bool {
    deployment_desired(deployment) == 0
}

pub fn is_statefulset_orphaned(statefulset: &StatefulSet) -> bool {
    statefulset_desired(statefulset) == 0
}
