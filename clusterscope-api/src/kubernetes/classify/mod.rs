//! Orphan classification
//!
//! Decides, per object, whether anything else in the snapshot still uses it.
//! Every rule is a pure function of the object and a [`SnapshotIndex`];
//! missing fields fall back to the "not referenced" reading.

pub mod cluster_resources;
pub mod config_storage;
pub mod networking;
pub mod rbac;
pub mod workloads;

use std::collections::HashMap;

use clusterscope_common::{ClassificationResult, ResourceKind};
use tracing::debug;

use super::deletion;
use super::index::SnapshotIndex;
use super::metadata::ObjectMetadata;
use super::snapshot::Snapshot;

/// Namespaces whose config objects and service accounts are never orphaned
pub const SYSTEM_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

pub fn is_system_namespace(namespace: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&namespace)
}

/// Orphaned iff the object has no owner references
pub fn is_unowned<T: ObjectMetadata + ?Sized>(obj: &T) -> bool {
    !obj.has_owner()
}

/// Identity of a classified object; namespace is empty when cluster-scoped
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of<T: ObjectMetadata + ?Sized>(kind: ResourceKind, obj: &T) -> Self {
        Self::new(kind, obj.namespace(), obj.name())
    }
}

/// Flags for every object in a snapshot
#[derive(Debug, Clone, Default)]
pub struct Classification {
    results: HashMap<ObjectKey, ClassificationResult>,
}

impl Classification {
    fn record<T: ObjectMetadata + ?Sized>(&mut self, kind: ResourceKind, obj: &T, orphaned: Option<bool>) {
        self.results
            .insert(ObjectKey::of(kind, obj), deletion::inspect(obj, orphaned));
    }

    pub fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<&ClassificationResult> {
        self.results.get(&ObjectKey::new(kind, namespace, name))
    }

    /// Flags for `obj`, or the all-clear default when it was never classified
    pub fn flags_for<T: ObjectMetadata + ?Sized>(&self, kind: ResourceKind, obj: &T) -> ClassificationResult {
        self.get(kind, obj.namespace(), obj.name())
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_orphaned(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<bool> {
        self.get(kind, namespace, name).and_then(|result| result.orphaned)
    }

    pub fn orphan_count(&self, kind: ResourceKind) -> usize {
        self.results
            .iter()
            .filter(|(key, result)| key.kind == kind && result.orphaned == Some(true))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectKey, &ClassificationResult)> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Classify every object in the snapshot
pub fn classify(snapshot: &Snapshot) -> Classification {
    let index = SnapshotIndex::build(snapshot);
    let mut out = Classification::default();

    for pod in &snapshot.pods {
        out.record(ResourceKind::Pod, pod, Some(is_unowned(pod)));
    }
    for d in &snapshot.deployments {
        out.record(ResourceKind::Deployment, d, Some(workloads::is_deployment_orphaned(d)));
    }
    for s in &snapshot.statefulsets {
        out.record(ResourceKind::StatefulSet, s, Some(workloads::is_statefulset_orphaned(s)));
    }
    for rs in &snapshot.replicasets {
        out.record(ResourceKind::ReplicaSet, rs, Some(is_unowned(rs)));
    }
    for ds in &snapshot.daemonsets {
        out.record(ResourceKind::DaemonSet, ds, Some(is_unowned(ds)));
    }
    // Jobs, CronJobs and StorageClasses are listed for display only
    for job in &snapshot.jobs {
        out.record(ResourceKind::Job, job, Some(false));
    }
    for cj in &snapshot.cronjobs {
        out.record(ResourceKind::CronJob, cj, Some(false));
    }
    for sc in &snapshot.storage_classes {
        out.record(ResourceKind::StorageClass, sc, Some(false));
    }

    for svc in &snapshot.services {
        out.record(ResourceKind::Service, svc, Some(networking::is_service_orphaned(svc, &index)));
    }
    for ing in &snapshot.ingresses {
        out.record(ResourceKind::Ingress, ing, Some(is_unowned(ing)));
    }
    for np in &snapshot.network_policies {
        out.record(ResourceKind::NetworkPolicy, np, Some(is_unowned(np)));
    }

    for pvc in &snapshot.pvcs {
        out.record(
            ResourceKind::PersistentVolumeClaim,
            pvc,
            Some(config_storage::is_pvc_orphaned(pvc, &index)),
        );
    }
    for pv in &snapshot.pvs {
        out.record(ResourceKind::PersistentVolume, pv, Some(config_storage::is_pv_orphaned(pv)));
    }
    for vs in &snapshot.volume_snapshots {
        out.record(ResourceKind::VolumeSnapshot, vs, Some(is_unowned(vs)));
    }
    for vsc in &snapshot.volume_snapshot_contents {
        out.record(ResourceKind::VolumeSnapshotContent, vsc, Some(is_unowned(vsc)));
    }
    for cm in &snapshot.configmaps {
        out.record(
            ResourceKind::ConfigMap,
            cm,
            Some(config_storage::is_configmap_orphaned(cm, &index)),
        );
    }
    for secret in &snapshot.secrets {
        out.record(
            ResourceKind::Secret,
            secret,
            Some(config_storage::is_secret_orphaned(secret, &index)),
        );
    }

    for sa in &snapshot.service_accounts {
        out.record(
            ResourceKind::ServiceAccount,
            sa,
            Some(rbac::is_service_account_orphaned(sa, &index)),
        );
    }
    for role in &snapshot.roles {
        out.record(ResourceKind::Role, role, Some(rbac::is_role_orphaned(role, &index)));
    }
    for rb in &snapshot.role_bindings {
        out.record(
            ResourceKind::RoleBinding,
            rb,
            Some(rbac::is_role_binding_orphaned(rb, &index)),
        );
    }
    for cr in &snapshot.cluster_roles {
        out.record(
            ResourceKind::ClusterRole,
            cr,
            Some(rbac::is_cluster_role_orphaned(cr, &index)),
        );
    }
    for crb in &snapshot.cluster_role_bindings {
        out.record(
            ResourceKind::ClusterRoleBinding,
            crb,
            Some(rbac::is_cluster_role_binding_orphaned(crb, &index)),
        );
    }

    for hpa in &snapshot.hpas {
        out.record(
            ResourceKind::HorizontalPodAutoscaler,
            hpa,
            Some(cluster_resources::is_hpa_orphaned(hpa, &index)),
        );
    }
    for pdb in &snapshot.pdbs {
        out.record(
            ResourceKind::PodDisruptionBudget,
            pdb,
            Some(cluster_resources::is_pdb_orphaned(pdb, &index)),
        );
    }
    for ns in &snapshot.namespaces {
        out.record(
            ResourceKind::Namespace,
            ns,
            Some(cluster_resources::is_namespace_orphaned(ns, &index)),
        );
    }
    for lr in &snapshot.limit_ranges {
        out.record(ResourceKind::LimitRange, lr, Some(is_unowned(lr)));
    }
    for rq in &snapshot.resource_quotas {
        out.record(ResourceKind::ResourceQuota, rq, Some(is_unowned(rq)));
    }

    for app in &snapshot.applications {
        out.record(ResourceKind::Application, app, None);
    }
    for snap in &snapshot.application_snapshots {
        out.record(ResourceKind::ApplicationSnapshot, snap, None);
    }
    for plan in &snapshot.protection_plans {
        out.record(ResourceKind::AppProtectionPlan, plan, None);
    }

    debug!(
        objects = out.len(),
        orphaned_pods = out.orphan_count(ResourceKind::Pod),
        orphaned_configmaps = out.orphan_count(ResourceKind::ConfigMap),
        orphaned_secrets = out.orphan_count(ResourceKind::Secret),
        "Classified snapshot"
    );

    out
}
