//! Node-centric cluster overview

use std::collections::{BTreeMap, HashMap};

use clusterscope_common::cluster::{
    ClusterOverview, NodePod, NodeSummary, ServicePortSummary, ServiceSummary, WorkloadKind,
    WorkloadSummary,
};
use k8s_openapi::api::core::v1::{Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::classify::workloads::{deployment_desired, statefulset_desired};
use super::metadata::ObjectMetadata;
use super::snapshot::Snapshot;

const CONTROL_PLANE_LABELS: &[&str] = &[
    "node-role.kubernetes.io/control-plane",
    "node-role.kubernetes.io/master",
];

/// Node labels naming a worker pool, checked in order
const POOL_LABELS: &[&str] = &[
    "node.kubernetes.io/pool",
    "cloud.google.com/gke-nodepool",
    "eks.amazonaws.com/nodegroup",
    "kubernetes.azure.com/agentpool",
    "agentpool",
];

pub const DEFAULT_POOL: &str = "default-pool";

fn is_terminal(pod: &Pod) -> bool {
    matches!(
        pod.status.as_ref().and_then(|s| s.phase.as_deref()),
        Some("Succeeded" | "Failed")
    )
}

fn pod_phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.phase.as_deref())
}

fn is_node_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

fn is_control_plane(node: &Node) -> bool {
    CONTROL_PLANE_LABELS.iter().any(|label| node.label(label).is_some())
}

pub fn pool_name(node: &Node) -> String {
    POOL_LABELS
        .iter()
        .find_map(|label| node.label(label))
        .filter(|pool| !pool.is_empty())
        .unwrap_or(DEFAULT_POOL)
        .to_string()
}

/// Requests of the last container declaring each resource
fn pod_requests(pod: &Pod) -> (String, String) {
    let mut cpu = "0".to_string();
    let mut memory = "0".to_string();

    let containers = pod.spec.as_ref().map(|s| s.containers.as_slice()).unwrap_or_default();
    for requests in containers
        .iter()
        .filter_map(|c| c.resources.as_ref())
        .filter_map(|r| r.requests.as_ref())
    {
        if let Some(q) = requests.get("cpu") {
            cpu = q.0.clone();
        }
        if let Some(q) = requests.get("memory") {
            memory = q.0.clone();
        }
    }
    (cpu, memory)
}

fn node_pod(pod: &Pod) -> NodePod {
    let (cpu_request, memory_request) = pod_requests(pod);
    NodePod {
        name: pod.name().to_string(),
        namespace: pod.namespace().to_string(),
        status: pod_phase(pod).unwrap_or("Unknown").to_string(),
        cpu_request,
        memory_request,
        labels: pod.metadata.labels.clone().unwrap_or_default(),
    }
}

fn node_summary(node: &Node, is_control_plane: bool, pods: Vec<NodePod>) -> NodeSummary {
    let status = node.status.as_ref();
    let info = status.and_then(|s| s.node_info.as_ref());
    let capacity = |key: &str| {
        status
            .and_then(|s| s.capacity.as_ref())
            .and_then(|c| c.get(key))
            .map(|q| q.0.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    };
    let address = |kind: &str| {
        status
            .and_then(|s| s.addresses.as_ref())
            .and_then(|addresses| addresses.iter().find(|a| a.type_ == kind))
            .map(|a| a.address.clone())
    };

    NodeSummary {
        name: node.name().to_string(),
        status: if is_node_ready(node) { "Ready" } else { "NotReady" }.to_string(),
        roles: vec![if is_control_plane { "control-plane" } else { "worker" }.to_string()],
        version: info.map(|i| i.kubelet_version.clone()).unwrap_or_default(),
        os: info.map(|i| i.os_image.clone()).unwrap_or_default(),
        container_runtime: info
            .map(|i| i.container_runtime_version.clone())
            .unwrap_or_default(),
        cpu_capacity: capacity("cpu"),
        memory_capacity: capacity("memory"),
        pods,
        internal_ip: address("InternalIP"),
        external_ip: address("ExternalIP"),
    }
}

fn service_summary(svc: &Service) -> ServiceSummary {
    let spec = svc.spec.as_ref();
    ServiceSummary {
        name: svc.name().to_string(),
        namespace: svc.namespace().to_string(),
        service_type: spec.and_then(|s| s.type_.clone()),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()),
        external_ips: spec.and_then(|s| s.external_ips.clone()).unwrap_or_default(),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| ServicePortSummary {
                        name: p.name.clone(),
                        port: p.port,
                        target_port: p.target_port.as_ref().map(|t| match t {
                            IntOrString::Int(n) => n.to_string(),
                            IntOrString::String(s) => s.clone(),
                        }),
                        protocol: p.protocol.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
        load_balancer_ip: svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|ingress| ingress.iter().find_map(|i| i.ip.clone())),
    }
}

fn workload_summaries(snapshot: &Snapshot) -> Vec<WorkloadSummary> {
    let deployments = snapshot.deployments.iter().map(|d| {
        let status = d.status.as_ref();
        WorkloadSummary {
            name: d.name().to_string(),
            namespace: d.namespace().to_string(),
            replicas: deployment_desired(d),
            ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
            available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
            labels: d.metadata.labels.clone().unwrap_or_default(),
            selector: d
                .spec
                .as_ref()
                .and_then(|s| s.selector.match_labels.clone())
                .unwrap_or_default(),
            kind: WorkloadKind::Deployment,
        }
    });

    // StatefulSets report ready replicas as available
    let statefulsets = snapshot.statefulsets.iter().map(|s| {
        let ready = s.status.as_ref().and_then(|st| st.ready_replicas).unwrap_or(0);
        WorkloadSummary {
            name: s.name().to_string(),
            namespace: s.namespace().to_string(),
            replicas: statefulset_desired(s),
            ready_replicas: ready,
            available_replicas: ready,
            labels: s.metadata.labels.clone().unwrap_or_default(),
            selector: s
                .spec
                .as_ref()
                .and_then(|spec| spec.selector.match_labels.clone())
                .unwrap_or_default(),
            kind: WorkloadKind::StatefulSet,
        }
    });

    deployments.chain(statefulsets).collect()
}

/// Build the overview from a snapshot
pub fn build_overview(cluster_name: &str, snapshot: &Snapshot) -> ClusterOverview {
    let mut pods_by_node: HashMap<&str, Vec<NodePod>> = HashMap::new();
    for pod in snapshot.pods.iter().filter(|p| !is_terminal(p)) {
        if let Some(node) = pod.spec.as_ref().and_then(|s| s.node_name.as_deref()) {
            pods_by_node.entry(node).or_default().push(node_pod(pod));
        }
    }

    let mut master_nodes = Vec::new();
    let mut worker_pools: BTreeMap<String, Vec<NodeSummary>> = BTreeMap::new();
    for node in &snapshot.nodes {
        let pods = pods_by_node.remove(node.name()).unwrap_or_default();
        if is_control_plane(node) {
            master_nodes.push(node_summary(node, true, pods));
        } else {
            worker_pools
                .entry(pool_name(node))
                .or_default()
                .push(node_summary(node, false, pods));
        }
    }

    ClusterOverview {
        cluster_name: cluster_name.to_string(),
        kubernetes_version: snapshot
            .nodes
            .first()
            .and_then(|n| n.status.as_ref())
            .and_then(|s| s.node_info.as_ref())
            .map(|info| info.kubelet_version.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        total_nodes: snapshot.nodes.len(),
        ready_nodes: snapshot.nodes.iter().filter(|n| is_node_ready(n)).count(),
        total_pods: snapshot.pods.iter().filter(|p| !is_terminal(p)).count(),
        running_pods: snapshot
            .pods
            .iter()
            .filter(|p| pod_phase(p) == Some("Running"))
            .count(),
        master_nodes,
        worker_pools,
        deployments: workload_summaries(snapshot),
        services: snapshot.services.iter().map(service_summary).collect(),
        last_updated: snapshot.fetched_at.to_rfc3339(),
        error: None,
    }
}
