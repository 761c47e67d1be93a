//! Cluster overview and workload scaling payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalable workload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deployment => write!(f, "Deployment"),
            Self::StatefulSet => write!(f, "StatefulSet"),
        }
    }
}

/// Node-centric view of the whole cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterOverview {
    pub cluster_name: String,
    pub kubernetes_version: String,
    pub total_nodes: usize,
    pub ready_nodes: usize,
    /// Pods that are neither Succeeded nor Failed
    pub total_pods: usize,
    pub running_pods: usize,
    pub master_nodes: Vec<NodeSummary>,
    pub worker_pools: BTreeMap<String, Vec<NodeSummary>>,
    pub deployments: Vec<WorkloadSummary>,
    pub services: Vec<ServiceSummary>,
    pub last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClusterOverview {
    /// Empty overview carrying the reason the cluster could not be read
    pub fn unavailable(cluster_name: &str, error: impl Into<String>, last_updated: String) -> Self {
        Self {
            cluster_name: cluster_name.to_string(),
            kubernetes_version: "Unknown".to_string(),
            last_updated,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    /// `Ready` or `NotReady`
    pub status: String,
    pub roles: Vec<String>,
    pub version: String,
    pub os: String,
    pub container_runtime: String,
    pub cpu_capacity: String,
    pub memory_capacity: String,
    pub pods: Vec<NodePod>,
    pub internal_ip: Option<String>,
    pub external_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePod {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub cpu_request: String,
    pub memory_request: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub labels: BTreeMap<String, String>,
    pub selector: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub cluster_ip: Option<String>,
    pub external_ips: Vec<String>,
    pub ports: Vec<ServicePortSummary>,
    pub selector: BTreeMap<String, String>,
    pub load_balancer_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePortSummary {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<String>,
    pub protocol: Option<String>,
}

/// Result of a scale request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleResponse {
    pub success: bool,
    pub message: String,
    pub deployment: String,
    pub namespace: String,
    pub replicas: i32,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
}

/// Current replica counts of a Deployment or StatefulSet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaStatus {
    pub deployment: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
    pub desired_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub updated_replicas: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_replicas: Option<i32>,
}

/// Result of a forced snapshot refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub nodes: usize,
    pub pods: usize,
}
