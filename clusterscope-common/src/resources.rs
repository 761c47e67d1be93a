//! Resource inventory records
//!
//! Flat, display-oriented projections of cluster objects together with the
//! derived orphan and deletion flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every object kind tracked by the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Pod,
    Deployment,
    StatefulSet,
    ReplicaSet,
    DaemonSet,
    Job,
    CronJob,
    Service,
    Endpoints,
    Ingress,
    NetworkPolicy,
    PersistentVolumeClaim,
    PersistentVolume,
    StorageClass,
    VolumeSnapshot,
    VolumeSnapshotContent,
    ConfigMap,
    Secret,
    ServiceAccount,
    Role,
    RoleBinding,
    ClusterRole,
    ClusterRoleBinding,
    HorizontalPodAutoscaler,
    PodDisruptionBudget,
    Namespace,
    LimitRange,
    ResourceQuota,
    Node,
    Application,
    ApplicationSnapshot,
    AppProtectionPlan,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::ReplicaSet => "ReplicaSet",
            Self::DaemonSet => "DaemonSet",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
            Self::Service => "Service",
            Self::Endpoints => "Endpoints",
            Self::Ingress => "Ingress",
            Self::NetworkPolicy => "NetworkPolicy",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::PersistentVolume => "PersistentVolume",
            Self::StorageClass => "StorageClass",
            Self::VolumeSnapshot => "VolumeSnapshot",
            Self::VolumeSnapshotContent => "VolumeSnapshotContent",
            Self::ConfigMap => "ConfigMap",
            Self::Secret => "Secret",
            Self::ServiceAccount => "ServiceAccount",
            Self::Role => "Role",
            Self::RoleBinding => "RoleBinding",
            Self::ClusterRole => "ClusterRole",
            Self::ClusterRoleBinding => "ClusterRoleBinding",
            Self::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            Self::PodDisruptionBudget => "PodDisruptionBudget",
            Self::Namespace => "Namespace",
            Self::LimitRange => "LimitRange",
            Self::ResourceQuota => "ResourceQuota",
            Self::Node => "Node",
            Self::Application => "Application",
            Self::ApplicationSnapshot => "ApplicationSnapshot",
            Self::AppProtectionPlan => "AppProtectionPlan",
        }
    }

    /// Cluster-scoped kinds are keyed with an empty namespace
    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            Self::PersistentVolume
                | Self::StorageClass
                | Self::VolumeSnapshotContent
                | Self::ClusterRole
                | Self::ClusterRoleBinding
                | Self::Namespace
                | Self::Node
        )
    }

    /// Kinds served by an extension API group rather than the core platform
    pub fn is_custom_resource(&self) -> bool {
        matches!(
            self,
            Self::Application | Self::ApplicationSnapshot | Self::AppProtectionPlan
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived flags attached to every inventory record
///
/// `orphaned` is `None` for kinds that are not classified (custom resources).
/// `finalizers` is only populated while the object is pending deletion.
/// `deletion_timestamp` is RFC 3339 for typed objects and the raw value for
/// custom resources whose timestamp does not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orphaned: Option<bool>,
    pub pending_deletion: bool,
    pub deletion_timestamp: Option<String>,
    #[serde(default)]
    pub finalizers: Vec<String>,
}

/// Identity and flags shared by all records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMeta {
    pub name: String,
    pub namespace: String,
    /// RFC 3339 creation timestamp, empty when unknown
    pub age: String,
    #[serde(flatten)]
    pub flags: ClassificationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub status: String,
    /// `ready/total` containers
    pub ready: String,
    pub restarts: i32,
    pub node: String,
    pub owner_name: Option<String>,
    pub owner_kind: Option<String>,
}

/// Deployment or StatefulSet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(rename = "type")]
    pub kind: String,
    /// `ready/desired` replicas
    pub replicas: String,
    pub labels: BTreeMap<String, String>,
}

/// ReplicaSet or DaemonSet replica counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaCountRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub desired: i32,
    pub current: i32,
    pub ready: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// `succeeded/completions`
    pub completions: String,
    pub active: i32,
    pub failed: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub schedule: String,
    pub suspend: bool,
    pub last_schedule: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: String,
    #[serde(rename = "externalIP")]
    pub external_ip: String,
    /// Comma-separated `port/protocol` pairs
    pub ports: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub ingress_class: Option<String>,
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicyRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub policy_types: Vec<String>,
    pub pod_selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PvcRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub status: String,
    pub volume: String,
    pub capacity: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PvRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub capacity: String,
    pub access_modes: String,
    pub reclaim_policy: String,
    pub status: String,
    pub claim: String,
    pub claim_namespace: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub provisioner: String,
    pub reclaim_policy: String,
    pub is_default: bool,
}

/// VolumeSnapshot or VolumeSnapshotContent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub ready_to_use: Option<bool>,
    /// Source PVC for snapshots, bound snapshot for contents
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMapRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub data_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(rename = "type")]
    pub secret_type: String,
    pub data_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub secrets: usize,
}

/// Role or ClusterRole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub rules: usize,
}

/// RoleBinding or ClusterRoleBinding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// `Kind/name` of the bound role
    pub role_ref: String,
    pub subjects: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// `Kind/name` of the scale target
    pub target: String,
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub current_replicas: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub min_available: Option<String>,
    pub max_unavailable: Option<String>,
    pub selector: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitRangeRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub limits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceQuotaRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub hard: BTreeMap<String, String>,
}

/// Application or ApplicationSnapshot lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomResourceRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionPlanRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub application: String,
}

/// Full inventory payload served by `GET /api/resources`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesResponse {
    pub pods: Vec<PodRecord>,
    pub deployments: Vec<WorkloadRecord>,
    pub statefulsets: Vec<WorkloadRecord>,
    pub replicasets: Vec<ReplicaCountRecord>,
    pub daemonsets: Vec<ReplicaCountRecord>,
    pub jobs: Vec<JobRecord>,
    pub cronjobs: Vec<CronJobRecord>,
    pub services: Vec<ServiceRecord>,
    pub ingresses: Vec<IngressRecord>,
    pub networkpolicies: Vec<NetworkPolicyRecord>,
    pub pvcs: Vec<PvcRecord>,
    pub pvs: Vec<PvRecord>,
    pub storageclasses: Vec<StorageClassRecord>,
    pub volumesnapshots: Vec<VolumeSnapshotRecord>,
    pub volumesnapshotcontents: Vec<VolumeSnapshotRecord>,
    pub configmaps: Vec<ConfigMapRecord>,
    pub secrets: Vec<SecretRecord>,
    pub serviceaccounts: Vec<ServiceAccountRecord>,
    pub roles: Vec<RoleRecord>,
    pub rolebindings: Vec<BindingRecord>,
    pub clusterroles: Vec<RoleRecord>,
    pub clusterrolebindings: Vec<BindingRecord>,
    pub hpas: Vec<HpaRecord>,
    pub pdbs: Vec<PdbRecord>,
    pub namespaces: Vec<NamespaceRecord>,
    pub limitranges: Vec<LimitRangeRecord>,
    pub resourcequotas: Vec<ResourceQuotaRecord>,
    pub applications: Vec<CustomResourceRecord>,
    pub snapshots: Vec<CustomResourceRecord>,
    pub protection_plans: Vec<ProtectionPlanRecord>,
    /// Kinds that could not be listed and were reported empty
    pub warnings: Vec<String>,
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_meta_flattens_flags() {
        let record = ConfigMapRecord {
            meta: RecordMeta {
                name: "settings".to_string(),
                namespace: "default".to_string(),
                age: String::new(),
                flags: ClassificationResult {
                    orphaned: Some(true),
                    ..Default::default()
                },
            },
            data_keys: 2,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "settings");
        assert_eq!(json["orphaned"], true);
        assert_eq!(json["pendingDeletion"], false);
        assert!(json["deletionTimestamp"].is_null());
        assert_eq!(json["data_keys"], 2);
    }

    #[test]
    fn test_unclassified_record_omits_orphaned() {
        let record = CustomResourceRecord {
            meta: RecordMeta {
                name: "app".to_string(),
                namespace: "ns".to_string(),
                ..Default::default()
            },
            state: "Active".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("orphaned").is_none());
        assert_eq!(json["state"], "Active");
    }

    #[test]
    fn test_kind_scope() {
        assert!(ResourceKind::Pod.is_namespaced());
        assert!(!ResourceKind::ClusterRole.is_namespaced());
        assert!(!ResourceKind::PersistentVolume.is_namespaced());
        assert!(ResourceKind::Application.is_custom_resource());
        assert!(!ResourceKind::VolumeSnapshot.is_custom_resource());
        assert_eq!(ResourceKind::HorizontalPodAutoscaler.to_string(), "HorizontalPodAutoscaler");
    }
}
