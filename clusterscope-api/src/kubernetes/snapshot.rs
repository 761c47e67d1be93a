//! Point-in-time collection of every inspected kind
//!
//! All list calls are issued concurrently. A failure of a required kind
//! fails the whole snapshot; optional kinds degrade to empty lists and are
//! recorded in [`Snapshot::degraded`].

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::time::Instant;

use chrono::{DateTime, Utc};
use clusterscope_common::ResourceKind;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, Endpoints, LimitRange, Namespace, Node, PersistentVolume, PersistentVolumeClaim,
    Pod, ResourceQuota, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::api::storage::v1::StorageClass;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::client::K8sClient;
use super::error::{FetchError, K8sResult};

const SNAPSHOT_GROUP: &str = "snapshot.storage.k8s.io";
const DATASERVICES_GROUP: &str = "dataservices.nutanix.com";

/// Kinds whose absence makes a snapshot meaningless
pub const REQUIRED_KINDS: &[ResourceKind] = &[
    ResourceKind::Pod,
    ResourceKind::Node,
    ResourceKind::Deployment,
    ResourceKind::StatefulSet,
    ResourceKind::ReplicaSet,
    ResourceKind::Service,
    ResourceKind::Endpoints,
    ResourceKind::PersistentVolumeClaim,
    ResourceKind::PersistentVolume,
    ResourceKind::ConfigMap,
    ResourceKind::Secret,
    ResourceKind::ServiceAccount,
];

fn api_resource(group: &str, version: &str, kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: group.to_string(),
        version: version.to_string(),
        api_version: format!("{}/{}", group, version),
        kind: kind.to_string(),
        plural: plural.to_string(),
    }
}

/// API descriptor for kinds that are not part of k8s-openapi
pub fn custom_api_resource(kind: ResourceKind) -> Option<ApiResource> {
    match kind {
        ResourceKind::VolumeSnapshot => Some(api_resource(
            SNAPSHOT_GROUP,
            "v1",
            "VolumeSnapshot",
            "volumesnapshots",
        )),
        ResourceKind::VolumeSnapshotContent => Some(api_resource(
            SNAPSHOT_GROUP,
            "v1",
            "VolumeSnapshotContent",
            "volumesnapshotcontents",
        )),
        ResourceKind::Application => Some(api_resource(
            DATASERVICES_GROUP,
            "v1alpha1",
            "Application",
            "applications",
        )),
        ResourceKind::ApplicationSnapshot => Some(api_resource(
            DATASERVICES_GROUP,
            "v1alpha1",
            "ApplicationSnapshot",
            "applicationsnapshots",
        )),
        ResourceKind::AppProtectionPlan => Some(api_resource(
            DATASERVICES_GROUP,
            "v1alpha1",
            "AppProtectionPlan",
            "appprotectionplans",
        )),
        _ => None,
    }
}

/// Which kinds must be listable for a snapshot to succeed
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    required: BTreeSet<ResourceKind>,
}

impl FetchPolicy {
    pub fn new(required: impl IntoIterator<Item = ResourceKind>) -> Self {
        Self {
            required: required.into_iter().collect(),
        }
    }

    pub fn is_required(&self, kind: ResourceKind) -> bool {
        self.required.contains(&kind)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::new(REQUIRED_KINDS.iter().copied())
    }
}

/// Immutable view of the cluster taken at `fetched_at`
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pods: Vec<Pod>,
    pub nodes: Vec<Node>,
    pub deployments: Vec<Deployment>,
    pub statefulsets: Vec<StatefulSet>,
    pub replicasets: Vec<ReplicaSet>,
    pub daemonsets: Vec<DaemonSet>,
    pub jobs: Vec<Job>,
    pub cronjobs: Vec<CronJob>,
    pub services: Vec<Service>,
    pub endpoints: Vec<Endpoints>,
    pub ingresses: Vec<Ingress>,
    pub network_policies: Vec<NetworkPolicy>,
    pub pvcs: Vec<PersistentVolumeClaim>,
    pub pvs: Vec<PersistentVolume>,
    pub storage_classes: Vec<StorageClass>,
    pub volume_snapshots: Vec<DynamicObject>,
    pub volume_snapshot_contents: Vec<DynamicObject>,
    pub configmaps: Vec<ConfigMap>,
    pub secrets: Vec<Secret>,
    pub service_accounts: Vec<ServiceAccount>,
    pub roles: Vec<Role>,
    pub role_bindings: Vec<RoleBinding>,
    pub cluster_roles: Vec<ClusterRole>,
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    pub hpas: Vec<HorizontalPodAutoscaler>,
    pub pdbs: Vec<PodDisruptionBudget>,
    pub namespaces: Vec<Namespace>,
    pub limit_ranges: Vec<LimitRange>,
    pub resource_quotas: Vec<ResourceQuota>,
    pub applications: Vec<DynamicObject>,
    pub application_snapshots: Vec<DynamicObject>,
    pub protection_plans: Vec<DynamicObject>,
    /// Optional kinds that could not be listed
    pub degraded: Vec<ResourceKind>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Human-readable notes for degraded kinds
    pub fn warnings(&self) -> Vec<String> {
        self.degraded
            .iter()
            .map(|kind| format!("Could not list {} objects; showing none", kind))
            .collect()
    }

    pub fn total_objects(&self) -> usize {
        self.pods.len()
            + self.nodes.len()
            + self.deployments.len()
            + self.statefulsets.len()
            + self.replicasets.len()
            + self.daemonsets.len()
            + self.jobs.len()
            + self.cronjobs.len()
            + self.services.len()
            + self.endpoints.len()
            + self.ingresses.len()
            + self.network_policies.len()
            + self.pvcs.len()
            + self.pvs.len()
            + self.storage_classes.len()
            + self.volume_snapshots.len()
            + self.volume_snapshot_contents.len()
            + self.configmaps.len()
            + self.secrets.len()
            + self.service_accounts.len()
            + self.roles.len()
            + self.role_bindings.len()
            + self.cluster_roles.len()
            + self.cluster_role_bindings.len()
            + self.hpas.len()
            + self.pdbs.len()
            + self.namespaces.len()
            + self.limit_ranges.len()
            + self.resource_quotas.len()
            + self.applications.len()
            + self.application_snapshots.len()
            + self.protection_plans.len()
    }
}

type Listed<T> = Result<Vec<T>, FetchError>;

/// Raw per-kind results of one fetch round
#[derive(Debug)]
pub struct FetchedLists {
    pub pods: Listed<Pod>,
    pub nodes: Listed<Node>,
    pub deployments: Listed<Deployment>,
    pub statefulsets: Listed<StatefulSet>,
    pub replicasets: Listed<ReplicaSet>,
    pub daemonsets: Listed<DaemonSet>,
    pub jobs: Listed<Job>,
    pub cronjobs: Listed<CronJob>,
    pub services: Listed<Service>,
    pub endpoints: Listed<Endpoints>,
    pub ingresses: Listed<Ingress>,
    pub network_policies: Listed<NetworkPolicy>,
    pub pvcs: Listed<PersistentVolumeClaim>,
    pub pvs: Listed<PersistentVolume>,
    pub storage_classes: Listed<StorageClass>,
    pub volume_snapshots: Listed<DynamicObject>,
    pub volume_snapshot_contents: Listed<DynamicObject>,
    pub configmaps: Listed<ConfigMap>,
    pub secrets: Listed<Secret>,
    pub service_accounts: Listed<ServiceAccount>,
    pub roles: Listed<Role>,
    pub role_bindings: Listed<RoleBinding>,
    pub cluster_roles: Listed<ClusterRole>,
    pub cluster_role_bindings: Listed<ClusterRoleBinding>,
    pub hpas: Listed<HorizontalPodAutoscaler>,
    pub pdbs: Listed<PodDisruptionBudget>,
    pub namespaces: Listed<Namespace>,
    pub limit_ranges: Listed<LimitRange>,
    pub resource_quotas: Listed<ResourceQuota>,
    pub applications: Listed<DynamicObject>,
    pub application_snapshots: Listed<DynamicObject>,
    pub protection_plans: Listed<DynamicObject>,
    pub fetched_at: DateTime<Utc>,
}

fn settle_kind<T>(
    result: Listed<T>,
    policy: &FetchPolicy,
    degraded: &mut Vec<ResourceKind>,
) -> K8sResult<Vec<T>> {
    match result {
        Ok(items) => Ok(items),
        Err(err) if policy.is_required(err.kind) => Err(err.into()),
        Err(err) => {
            warn!(kind = %err.kind, error = %err.source, "Optional kind unavailable, reporting it empty");
            degraded.push(err.kind);
            Ok(Vec::new())
        }
    }
}

impl FetchedLists {
    /// Apply the policy: fail on the first required kind that errored,
    /// empty out optional failures
    pub fn settle(self, policy: &FetchPolicy) -> K8sResult<Snapshot> {
        let mut degraded = Vec::new();
        let d = &mut degraded;

        let mut snapshot = Snapshot {
            pods: settle_kind(self.pods, policy, d)?,
            nodes: settle_kind(self.nodes, policy, d)?,
            deployments: settle_kind(self.deployments, policy, d)?,
            statefulsets: settle_kind(self.statefulsets, policy, d)?,
            replicasets: settle_kind(self.replicasets, policy, d)?,
            daemonsets: settle_kind(self.daemonsets, policy, d)?,
            jobs: settle_kind(self.jobs, policy, d)?,
            cronjobs: settle_kind(self.cronjobs, policy, d)?,
            services: settle_kind(self.services, policy, d)?,
            endpoints: settle_kind(self.endpoints, policy, d)?,
            ingresses: settle_kind(self.ingresses, policy, d)?,
            network_policies: settle_kind(self.network_policies, policy, d)?,
            pvcs: settle_kind(self.pvcs, policy, d)?,
            pvs: settle_kind(self.pvs, policy, d)?,
            storage_classes: settle_kind(self.storage_classes, policy, d)?,
            volume_snapshots: settle_kind(self.volume_snapshots, policy, d)?,
            volume_snapshot_contents: settle_kind(self.volume_snapshot_contents, policy, d)?,
            configmaps: settle_kind(self.configmaps, policy, d)?,
            secrets: settle_kind(self.secrets, policy, d)?,
            service_accounts: settle_kind(self.service_accounts, policy, d)?,
            roles: settle_kind(self.roles, policy, d)?,
            role_bindings: settle_kind(self.role_bindings, policy, d)?,
            cluster_roles: settle_kind(self.cluster_roles, policy, d)?,
            cluster_role_bindings: settle_kind(self.cluster_role_bindings, policy, d)?,
            hpas: settle_kind(self.hpas, policy, d)?,
            pdbs: settle_kind(self.pdbs, policy, d)?,
            namespaces: settle_kind(self.namespaces, policy, d)?,
            limit_ranges: settle_kind(self.limit_ranges, policy, d)?,
            resource_quotas: settle_kind(self.resource_quotas, policy, d)?,
            applications: settle_kind(self.applications, policy, d)?,
            application_snapshots: settle_kind(self.application_snapshots, policy, d)?,
            protection_plans: settle_kind(self.protection_plans, policy, d)?,
            degraded: Vec::new(),
            fetched_at: self.fetched_at,
        };
        snapshot.degraded = degraded;
        Ok(snapshot)
    }
}

/// Issues the list calls for one snapshot
pub struct SnapshotFetcher<'a> {
    client: &'a K8sClient,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(client: &'a K8sClient) -> Self {
        Self { client }
    }

    async fn list<K>(&self, kind: ResourceKind) -> Listed<K>
    where
        K: kube::Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
    {
        let api: Api<K> = Api::all(self.client.inner().clone());
        let items = api
            .list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|source| FetchError { kind, source })?;
        debug!(%kind, count = items.len(), "Listed objects");
        Ok(items)
    }

    async fn list_dynamic(&self, kind: ResourceKind) -> Listed<DynamicObject> {
        let Some(resource) = custom_api_resource(kind) else {
            return Ok(Vec::new());
        };
        let api: Api<DynamicObject> = Api::all_with(self.client.inner().clone(), &resource);
        let items = api
            .list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|source| FetchError { kind, source })?;
        debug!(%kind, count = items.len(), "Listed objects");
        Ok(items)
    }

    /// List every kind concurrently
    pub async fn fetch_all(&self) -> FetchedLists {
        let started = Instant::now();
        let fetched_at = Utc::now();

        let (core, apps, platform) = tokio::join!(
            async {
                tokio::join!(
                    self.list::<Pod>(ResourceKind::Pod),
                    self.list::<Node>(ResourceKind::Node),
                    self.list::<Service>(ResourceKind::Service),
                    self.list::<Endpoints>(ResourceKind::Endpoints),
                    self.list::<PersistentVolumeClaim>(ResourceKind::PersistentVolumeClaim),
                    self.list::<PersistentVolume>(ResourceKind::PersistentVolume),
                    self.list::<ConfigMap>(ResourceKind::ConfigMap),
                    self.list::<Secret>(ResourceKind::Secret),
                    self.list::<ServiceAccount>(ResourceKind::ServiceAccount),
                    self.list::<Namespace>(ResourceKind::Namespace),
                    self.list::<LimitRange>(ResourceKind::LimitRange),
                    self.list::<ResourceQuota>(ResourceKind::ResourceQuota),
                )
            },
            async {
                tokio::join!(
                    self.list::<Deployment>(ResourceKind::Deployment),
                    self.list::<StatefulSet>(ResourceKind::StatefulSet),
                    self.list::<ReplicaSet>(ResourceKind::ReplicaSet),
                    self.list::<DaemonSet>(ResourceKind::DaemonSet),
                    self.list::<Job>(ResourceKind::Job),
                    self.list::<CronJob>(ResourceKind::CronJob),
                    self.list::<HorizontalPodAutoscaler>(ResourceKind::HorizontalPodAutoscaler),
                    self.list::<PodDisruptionBudget>(ResourceKind::PodDisruptionBudget),
                    self.list::<Ingress>(ResourceKind::Ingress),
                    self.list::<NetworkPolicy>(ResourceKind::NetworkPolicy),
                )
            },
            async {
                tokio::join!(
                    self.list::<StorageClass>(ResourceKind::StorageClass),
                    self.list_dynamic(ResourceKind::VolumeSnapshot),
                    self.list_dynamic(ResourceKind::VolumeSnapshotContent),
                    self.list::<Role>(ResourceKind::Role),
                    self.list::<RoleBinding>(ResourceKind::RoleBinding),
                    self.list::<ClusterRole>(ResourceKind::ClusterRole),
                    self.list::<ClusterRoleBinding>(ResourceKind::ClusterRoleBinding),
                    self.list_dynamic(ResourceKind::Application),
                    self.list_dynamic(ResourceKind::ApplicationSnapshot),
                    self.list_dynamic(ResourceKind::AppProtectionPlan),
                )
            },
        );

        let (
            pods,
            nodes,
            services,
            endpoints,
            pvcs,
            pvs,
            configmaps,
            secrets,
            service_accounts,
            namespaces,
            limit_ranges,
            resource_quotas,
        ) = core;
        let (
            deployments,
            statefulsets,
            replicasets,
            daemonsets,
            jobs,
            cronjobs,
            hpas,
            pdbs,
            ingresses,
            network_policies,
        ) = apps;
        let (
            storage_classes,
            volume_snapshots,
            volume_snapshot_contents,
            roles,
            role_bindings,
            cluster_roles,
            cluster_role_bindings,
            applications,
            application_snapshots,
            protection_plans,
        ) = platform;

        info!(
            cluster = %self.client.cluster_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched cluster snapshot"
        );

        FetchedLists {
            pods,
            nodes,
            deployments,
            statefulsets,
            replicasets,
            daemonsets,
            jobs,
            cronjobs,
            services,
            endpoints,
            ingresses,
            network_policies,
            pvcs,
            pvs,
            storage_classes,
            volume_snapshots,
            volume_snapshot_contents,
            configmaps,
            secrets,
            service_accounts,
            roles,
            role_bindings,
            cluster_roles,
            cluster_role_bindings,
            hpas,
            pdbs,
            namespaces,
            limit_ranges,
            resource_quotas,
            applications,
            application_snapshots,
            protection_plans,
            fetched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::error::K8sError;

    fn unavailable(kind: ResourceKind) -> FetchError {
        FetchError {
            kind,
            source: kube::Error::Api(kube::core::ErrorResponse {
                status: "Failure".to_string(),
                message: "the server could not find the requested resource".to_string(),
                reason: "NotFound".to_string(),
                code: 404,
            }),
        }
    }

    fn all_ok() -> FetchedLists {
        FetchedLists {
            pods: Ok(Vec::new()),
            nodes: Ok(Vec::new()),
            deployments: Ok(Vec::new()),
            statefulsets: Ok(Vec::new()),
            replicasets: Ok(Vec::new()),
            daemonsets: Ok(Vec::new()),
            jobs: Ok(Vec::new()),
            cronjobs: Ok(Vec::new()),
            services: Ok(Vec::new()),
            endpoints: Ok(Vec::new()),
            ingresses: Ok(Vec::new()),
            network_policies: Ok(Vec::new()),
            pvcs: Ok(Vec::new()),
            pvs: Ok(Vec::new()),
            storage_classes: Ok(Vec::new()),
            volume_snapshots: Ok(Vec::new()),
            volume_snapshot_contents: Ok(Vec::new()),
            configmaps: Ok(Vec::new()),
            secrets: Ok(Vec::new()),
            service_accounts: Ok(Vec::new()),
            roles: Ok(Vec::new()),
            role_bindings: Ok(Vec::new()),
            cluster_roles: Ok(Vec::new()),
            cluster_role_bindings: Ok(Vec::new()),
            hpas: Ok(Vec::new()),
            pdbs: Ok(Vec::new()),
            namespaces: Ok(Vec::new()),
            limit_ranges: Ok(Vec::new()),
            resource_quotas: Ok(Vec::new()),
            applications: Ok(Vec::new()),
            application_snapshots: Ok(Vec::new()),
            protection_plans: Ok(Vec::new()),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_policy_requires_core_kinds() {
        let policy = FetchPolicy::default();
        assert!(policy.is_required(ResourceKind::Pod));
        assert!(policy.is_required(ResourceKind::Endpoints));
        assert!(!policy.is_required(ResourceKind::VolumeSnapshot));
        assert!(!policy.is_required(ResourceKind::Application));
        assert!(!policy.is_required(ResourceKind::HorizontalPodAutoscaler));
    }

    #[test]
    fn test_optional_failure_degrades_to_empty() {
        let mut lists = all_ok();
        lists.volume_snapshots = Err(unavailable(ResourceKind::VolumeSnapshot));
        lists.applications = Err(unavailable(ResourceKind::Application));

        let snapshot = lists.settle(&FetchPolicy::default()).unwrap();
        assert!(snapshot.volume_snapshots.is_empty());
        assert_eq!(
            snapshot.degraded,
            vec![ResourceKind::VolumeSnapshot, ResourceKind::Application]
        );
        assert_eq!(snapshot.warnings().len(), 2);
        assert!(snapshot.warnings()[0].contains("VolumeSnapshot"));
    }

    #[test]
    fn test_required_failure_fails_snapshot() {
        let mut lists = all_ok();
        lists.secrets = Err(unavailable(ResourceKind::Secret));

        match lists.settle(&FetchPolicy::default()) {
            Err(K8sError::Fetch(err)) => assert_eq!(err.kind, ResourceKind::Secret),
            other => panic!("expected fetch error, got {:?}", other.map(|s| s.degraded)),
        }
    }

    #[test]
    fn test_custom_policy_can_relax_requirements() {
        let mut lists = all_ok();
        lists.secrets = Err(unavailable(ResourceKind::Secret));

        let snapshot = lists.settle(&FetchPolicy::new([ResourceKind::Pod])).unwrap();
        assert_eq!(snapshot.degraded, vec![ResourceKind::Secret]);
    }

    #[test]
    fn test_custom_api_resources() {
        let ar = custom_api_resource(ResourceKind::VolumeSnapshotContent).unwrap();
        assert_eq!(ar.api_version, "snapshot.storage.k8s.io/v1");
        assert_eq!(ar.plural, "volumesnapshotcontents");

        let ar = custom_api_resource(ResourceKind::AppProtectionPlan).unwrap();
        assert_eq!(ar.api_version, "dataservices.nutanix.com/v1alpha1");
        assert!(custom_api_resource(ResourceKind::Pod).is_none());
    }
}
