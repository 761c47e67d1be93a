//! Inventory response assembly
//!
//! Projects every snapshot object into its display record and merges the
//! classification flags back in by object identity.

use std::collections::BTreeMap;

use clusterscope_common::resources::*;
use clusterscope_common::ResourceKind;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, LimitRange, Namespace, PersistentVolume, PersistentVolumeClaim, Pod, ResourceQuota,
    Secret, Service, ServiceAccount,
};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::DynamicObject;
use serde_json::Value;

use super::classify::workloads::{deployment_desired, statefulset_desired};
use super::classify::Classification;
use super::metadata::ObjectMetadata;
use super::snapshot::Snapshot;

const DEFAULT_CLASS_ANNOTATION: &str = "storageclass.kubernetes.io/is-default-class";

/// Build the full inventory response
pub fn assemble(snapshot: &Snapshot, classification: &Classification) -> ResourcesResponse {
    let a = Assembler { classification };

    ResourcesResponse {
        pods: snapshot.pods.iter().map(|o| a.pod(o)).collect(),
        deployments: snapshot.deployments.iter().map(|o| a.deployment(o)).collect(),
        statefulsets: snapshot.statefulsets.iter().map(|o| a.statefulset(o)).collect(),
        replicasets: snapshot.replicasets.iter().map(|o| a.replicaset(o)).collect(),
        daemonsets: snapshot.daemonsets.iter().map(|o| a.daemonset(o)).collect(),
        jobs: snapshot.jobs.iter().map(|o| a.job(o)).collect(),
        cronjobs: snapshot.cronjobs.iter().map(|o| a.cronjob(o)).collect(),
        services: snapshot.services.iter().map(|o| a.service(o)).collect(),
        ingresses: snapshot.ingresses.iter().map(|o| a.ingress(o)).collect(),
        networkpolicies: snapshot.network_policies.iter().map(|o| a.network_policy(o)).collect(),
        pvcs: snapshot.pvcs.iter().map(|o| a.pvc(o)).collect(),
        pvs: snapshot.pvs.iter().map(|o| a.pv(o)).collect(),
        storageclasses: snapshot.storage_classes.iter().map(|o| a.storage_class(o)).collect(),
        volumesnapshots: snapshot
            .volume_snapshots
            .iter()
            .map(|o| a.volume_snapshot(ResourceKind::VolumeSnapshot, o))
            .collect(),
        volumesnapshotcontents: snapshot
            .volume_snapshot_contents
            .iter()
            .map(|o| a.volume_snapshot(ResourceKind::VolumeSnapshotContent, o))
            .collect(),
        configmaps: snapshot.configmaps.iter().map(|o| a.configmap(o)).collect(),
        secrets: snapshot.secrets.iter().map(|o| a.secret(o)).collect(),
        serviceaccounts: snapshot.service_accounts.iter().map(|o| a.service_account(o)).collect(),
        roles: snapshot.roles.iter().map(|o| a.role(o)).collect(),
        rolebindings: snapshot.role_bindings.iter().map(|o| a.role_binding(o)).collect(),
        clusterroles: snapshot.cluster_roles.iter().map(|o| a.cluster_role(o)).collect(),
        clusterrolebindings: snapshot
            .cluster_role_bindings
            .iter()
            .map(|o| a.cluster_role_binding(o))
            .collect(),
        hpas: snapshot.hpas.iter().map(|o| a.hpa(o)).collect(),
        pdbs: snapshot.pdbs.iter().map(|o| a.pdb(o)).collect(),
        namespaces: snapshot.namespaces.iter().map(|o| a.namespace(o)).collect(),
        limitranges: snapshot.limit_ranges.iter().map(|o| a.limit_range(o)).collect(),
        resourcequotas: snapshot.resource_quotas.iter().map(|o| a.resource_quota(o)).collect(),
        applications: snapshot
            .applications
            .iter()
            .map(|o| a.custom_resource(ResourceKind::Application, o, application_state(o)))
            .collect(),
        snapshots: snapshot
            .application_snapshots
            .iter()
            .map(|o| a.custom_resource(ResourceKind::ApplicationSnapshot, o, snapshot_state(o)))
            .collect(),
        protection_plans: snapshot.protection_plans.iter().map(|o| a.protection_plan(o)).collect(),
        warnings: snapshot.warnings(),
        last_updated: snapshot.fetched_at.to_rfc3339(),
    }
}

/// Lifecycle state of an Application from its first `Active` or `Ready` condition
pub fn application_state(app: &DynamicObject) -> String {
    let conditions = app
        .data
        .pointer("/status/conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for condition in conditions {
        let is_true = condition["status"].as_str() == Some("True");
        match condition["type"].as_str() {
            Some("Active") => return if is_true { "Active" } else { "Inactive" }.to_string(),
            Some("Ready") => return if is_true { "Ready" } else { "NotReady" }.to_string(),
            _ => {}
        }
    }
    "Unknown".to_string()
}

/// Lifecycle state of an ApplicationSnapshot from `status.readyToUse`
pub fn snapshot_state(snapshot: &DynamicObject) -> String {
    match snapshot.data.pointer("/status/readyToUse") {
        Some(Value::Bool(true)) => "Ready",
        Some(_) => "Not Ready",
        None => "Unknown",
    }
    .to_string()
}

fn int_or_string(value: &IntOrString) -> String {
    match value {
        IntOrString::Int(n) => n.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(String::from)
}

fn labels_at(value: &Value, pointer: &str) -> BTreeMap<String, String> {
    value
        .pointer(pointer)
        .and_then(Value::as_object)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

struct Assembler<'a> {
    classification: &'a Classification,
}

impl Assembler<'_> {
    fn meta<T: ObjectMetadata + ?Sized>(&self, kind: ResourceKind, obj: &T) -> RecordMeta {
        RecordMeta {
            name: obj.name().to_string(),
            namespace: obj.namespace().to_string(),
            age: obj.creation_timestamp().unwrap_or_default(),
            flags: self.classification.flags_for(kind, obj),
        }
    }

    fn pod(&self, pod: &Pod) -> PodRecord {
        let status = pod.status.as_ref();
        let statuses = status
            .and_then(|s| s.container_statuses.as_deref())
            .unwrap_or_default();
        let ready = statuses.iter().filter(|cs| cs.ready).count();
        let owner = pod.owner_references().into_iter().next();

        PodRecord {
            meta: self.meta(ResourceKind::Pod, pod),
            status: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ready: format!("{}/{}", ready, statuses.len()),
            restarts: statuses.iter().map(|cs| cs.restart_count).sum(),
            node: pod
                .spec
                .as_ref()
                .and_then(|s| s.node_name.clone())
                .unwrap_or_else(|| "Pending".to_string()),
            owner_kind: owner.as_ref().map(|o| o.kind.clone()),
            owner_name: owner.map(|o| o.name),
        }
    }

    fn deployment(&self, d: &Deployment) -> WorkloadRecord {
        let ready = d.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0);
        WorkloadRecord {
            meta: self.meta(ResourceKind::Deployment, d),
            kind: "Deployment".to_string(),
            replicas: format!("{}/{}", ready, deployment_desired(d)),
            labels: d.metadata.labels.clone().unwrap_or_default(),
        }
    }

    fn statefulset(&self, s: &StatefulSet) -> WorkloadRecord {
        let ready = s.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0);
        WorkloadRecord {
            meta: self.meta(ResourceKind::StatefulSet, s),
            kind: "StatefulSet".to_string(),
            replicas: format!("{}/{}", ready, statefulset_desired(s)),
            labels: s.metadata.labels.clone().unwrap_or_default(),
        }
    }

    fn replicaset(&self, rs: &ReplicaSet) -> ReplicaCountRecord {
        let status = rs.status.as_ref();
        ReplicaCountRecord {
            meta: self.meta(ResourceKind::ReplicaSet, rs),
            desired: rs.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0),
            current: status.map(|s| s.replicas).unwrap_or(0),
            ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        }
    }

    fn daemonset(&self, ds: &DaemonSet) -> ReplicaCountRecord {
        let status = ds.status.as_ref();
        ReplicaCountRecord {
            meta: self.meta(ResourceKind::DaemonSet, ds),
            desired: status.map(|s| s.desired_number_scheduled).unwrap_or(0),
            current: status.map(|s| s.current_number_scheduled).unwrap_or(0),
            ready: status.map(|s| s.number_ready).unwrap_or(0),
        }
    }

    fn job(&self, job: &Job) -> JobRecord {
        let status = job.status.as_ref();
        let completions = job.spec.as_ref().and_then(|s| s.completions).unwrap_or(1);
        JobRecord {
            meta: self.meta(ResourceKind::Job, job),
            completions: format!(
                "{}/{}",
                status.and_then(|s| s.succeeded).unwrap_or(0),
                completions
            ),
            active: status.and_then(|s| s.active).unwrap_or(0),
            failed: status.and_then(|s| s.failed).unwrap_or(0),
        }
    }

    fn cronjob(&self, cj: &CronJob) -> CronJobRecord {
        let spec = cj.spec.as_ref();
        CronJobRecord {
            meta: self.meta(ResourceKind::CronJob, cj),
            schedule: spec.map(|s| s.schedule.clone()).unwrap_or_default(),
            suspend: spec.and_then(|s| s.suspend).unwrap_or(false),
            last_schedule: cj
                .status
                .as_ref()
                .and_then(|s| s.last_schedule_time.as_ref())
                .map(|t| t.0.to_rfc3339()),
        }
    }

    fn service(&self, svc: &Service) -> ServiceRecord {
        let spec = svc.spec.as_ref();
        let external_ip = svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .and_then(|ingress| ingress.first())
            .and_then(|first| first.ip.clone())
            .unwrap_or_else(|| "-".to_string());
        let ports = spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| format!("{}/{}", p.port, p.protocol.as_deref().unwrap_or("TCP")))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();

        ServiceRecord {
            meta: self.meta(ResourceKind::Service, svc),
            service_type: spec
                .and_then(|s| s.type_.clone())
                .unwrap_or_else(|| "ClusterIP".to_string()),
            cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
            external_ip,
            ports,
        }
    }

    fn ingress(&self, ing: &Ingress) -> IngressRecord {
        let spec = ing.spec.as_ref();
        IngressRecord {
            meta: self.meta(ResourceKind::Ingress, ing),
            ingress_class: spec.and_then(|s| s.ingress_class_name.clone()),
            hosts: spec
                .and_then(|s| s.rules.as_ref())
                .map(|rules| rules.iter().filter_map(|r| r.host.clone()).collect())
                .unwrap_or_default(),
        }
    }

    fn network_policy(&self, np: &NetworkPolicy) -> NetworkPolicyRecord {
        let spec = serde_json::to_value(&np.spec).unwrap_or_default();
        NetworkPolicyRecord {
            meta: self.meta(ResourceKind::NetworkPolicy, np),
            policy_types: np
                .spec
                .as_ref()
                .and_then(|s| s.policy_types.clone())
                .unwrap_or_default(),
            pod_selector: labels_at(&spec, "/podSelector/matchLabels"),
        }
    }

    fn pvc(&self, pvc: &PersistentVolumeClaim) -> PvcRecord {
        let spec = pvc.spec.as_ref();
        let status = pvc.status.as_ref();
        let capacity = match status.and_then(|s| s.capacity.as_ref()) {
            Some(capacity) => capacity
                .get("storage")
                .map(|q| q.0.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            None => "Pending".to_string(),
        };

        PvcRecord {
            meta: self.meta(ResourceKind::PersistentVolumeClaim, pvc),
            status: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            volume: spec
                .and_then(|s| s.volume_name.clone())
                .unwrap_or_else(|| "Pending".to_string()),
            capacity,
            storage_class: spec
                .and_then(|s| s.storage_class_name.clone())
                .unwrap_or_else(|| "default".to_string()),
        }
    }

    fn pv(&self, pv: &PersistentVolume) -> PvRecord {
        let spec = pv.spec.as_ref();
        let claim = spec.and_then(|s| s.claim_ref.as_ref());
        PvRecord {
            meta: self.meta(ResourceKind::PersistentVolume, pv),
            capacity: spec
                .and_then(|s| s.capacity.as_ref())
                .and_then(|c| c.get("storage"))
                .map(|q| q.0.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            access_modes: spec
                .and_then(|s| s.access_modes.as_ref())
                .map(|modes| modes.join(","))
                .unwrap_or_default(),
            reclaim_policy: spec
                .and_then(|s| s.persistent_volume_reclaim_policy.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            status: pv
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            claim: claim
                .and_then(|c| c.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            claim_namespace: claim
                .and_then(|c| c.namespace.clone())
                .unwrap_or_else(|| "-".to_string()),
            storage_class: spec
                .and_then(|s| s.storage_class_name.clone())
                .unwrap_or_else(|| "default".to_string()),
        }
    }

    fn storage_class(&self, sc: &StorageClass) -> StorageClassRecord {
        StorageClassRecord {
            meta: self.meta(ResourceKind::StorageClass, sc),
            provisioner: sc.provisioner.clone(),
            reclaim_policy: sc
                .reclaim_policy
                .clone()
                .unwrap_or_else(|| "Delete".to_string()),
            is_default: sc.annotation(DEFAULT_CLASS_ANNOTATION) == Some("true"),
        }
    }

    fn volume_snapshot(&self, kind: ResourceKind, obj: &DynamicObject) -> VolumeSnapshotRecord {
        let source = match kind {
            ResourceKind::VolumeSnapshotContent => {
                let namespace = str_at(&obj.data, "/spec/volumeSnapshotRef/namespace");
                let name = str_at(&obj.data, "/spec/volumeSnapshotRef/name");
                match (namespace, name) {
                    (Some(ns), Some(name)) => format!("{}/{}", ns, name),
                    (None, Some(name)) => name,
                    _ => "-".to_string(),
                }
            }
            _ => str_at(&obj.data, "/spec/source/persistentVolumeClaimName")
                .or_else(|| str_at(&obj.data, "/spec/source/volumeSnapshotContentName"))
                .unwrap_or_else(|| "-".to_string()),
        };

        VolumeSnapshotRecord {
            meta: self.meta(kind, obj),
            ready_to_use: obj.data.pointer("/status/readyToUse").and_then(Value::as_bool),
            source,
        }
    }

    fn configmap(&self, cm: &ConfigMap) -> ConfigMapRecord {
        ConfigMapRecord {
            meta: self.meta(ResourceKind::ConfigMap, cm),
            data_keys: cm.data.as_ref().map(BTreeMap::len).unwrap_or(0),
        }
    }

    fn secret(&self, secret: &Secret) -> SecretRecord {
        SecretRecord {
            meta: self.meta(ResourceKind::Secret, secret),
            secret_type: secret.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
            data_keys: secret.data.as_ref().map(BTreeMap::len).unwrap_or(0),
        }
    }

    fn service_account(&self, sa: &ServiceAccount) -> ServiceAccountRecord {
        ServiceAccountRecord {
            meta: self.meta(ResourceKind::ServiceAccount, sa),
            secrets: sa.secrets.as_ref().map(Vec::len).unwrap_or(0),
        }
    }

    fn role(&self, role: &Role) -> RoleRecord {
        RoleRecord {
            meta: self.meta(ResourceKind::Role, role),
            rules: role.rules.as_ref().map(Vec::len).unwrap_or(0),
        }
    }

    fn cluster_role(&self, role: &ClusterRole) -> RoleRecord {
        RoleRecord {
            meta: self.meta(ResourceKind::ClusterRole, role),
            rules: role.rules.as_ref().map(Vec::len).unwrap_or(0),
        }
    }

    fn role_binding(&self, rb: &RoleBinding) -> BindingRecord {
        BindingRecord {
            meta: self.meta(ResourceKind::RoleBinding, rb),
            role_ref: format!("{}/{}", rb.role_ref.kind, rb.role_ref.name),
            subjects: rb.subjects.as_ref().map(Vec::len).unwrap_or(0),
        }
    }

    fn cluster_role_binding(&self, crb: &ClusterRoleBinding) -> BindingRecord {
        BindingRecord {
            meta: self.meta(ResourceKind::ClusterRoleBinding, crb),
            role_ref: format!("{}/{}", crb.role_ref.kind, crb.role_ref.name),
            subjects: crb.subjects.as_ref().map(Vec::len).unwrap_or(0),
        }
    }

    fn hpa(&self, hpa: &HorizontalPodAutoscaler) -> HpaRecord {
        let spec = hpa.spec.as_ref();
        HpaRecord {
            meta: self.meta(ResourceKind::HorizontalPodAutoscaler, hpa),
            target: spec
                .map(|s| format!("{}/{}", s.scale_target_ref.kind, s.scale_target_ref.name))
                .unwrap_or_else(|| "-".to_string()),
            min_replicas: spec.and_then(|s| s.min_replicas).unwrap_or(1),
            max_replicas: spec.map(|s| s.max_replicas).unwrap_or(0),
            current_replicas: hpa
                .status
                .as_ref()
                .and_then(|s| s.current_replicas)
                .unwrap_or(0),
        }
    }

    fn pdb(&self, pdb: &PodDisruptionBudget) -> PdbRecord {
        let spec = pdb.spec.as_ref();
        PdbRecord {
            meta: self.meta(ResourceKind::PodDisruptionBudget, pdb),
            min_available: spec.and_then(|s| s.min_available.as_ref()).map(int_or_string),
            max_unavailable: spec.and_then(|s| s.max_unavailable.as_ref()).map(int_or_string),
            selector: spec
                .and_then(|s| s.selector.as_ref())
                .and_then(|s| s.match_labels.clone())
                .unwrap_or_default(),
        }
    }

    fn namespace(&self, ns: &Namespace) -> NamespaceRecord {
        NamespaceRecord {
            meta: self.meta(ResourceKind::Namespace, ns),
            status: ns
                .status
                .as_ref()
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Active".to_string()),
        }
    }

    fn limit_range(&self, lr: &LimitRange) -> LimitRangeRecord {
        LimitRangeRecord {
            meta: self.meta(ResourceKind::LimitRange, lr),
            limits: lr.spec.as_ref().map(|s| s.limits.len()).unwrap_or(0),
        }
    }

    fn resource_quota(&self, rq: &ResourceQuota) -> ResourceQuotaRecord {
        ResourceQuotaRecord {
            meta: self.meta(ResourceKind::ResourceQuota, rq),
            hard: rq
                .spec
                .as_ref()
                .and_then(|s| s.hard.as_ref())
                .map(|hard| hard.iter().map(|(k, q)| (k.clone(), q.0.clone())).collect())
                .unwrap_or_default(),
        }
    }

    fn custom_resource(&self, kind: ResourceKind, obj: &DynamicObject, state: String) -> CustomResourceRecord {
        CustomResourceRecord {
            meta: self.meta(kind, obj),
            state,
        }
    }

    fn protection_plan(&self, plan: &DynamicObject) -> ProtectionPlanRecord {
        ProtectionPlanRecord {
            meta: self.meta(ResourceKind::AppProtectionPlan, plan),
            application: str_at(&plan.data, "/spec/applicationName").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::classify::classify;
    use crate::kubernetes::fixtures::*;
    use serde_json::json;

    fn app(conditions: Value) -> DynamicObject {
        dynamic(
            "dataservices.nutanix.com/v1alpha1",
            "Application",
            json!({"name": "db", "namespace": "apps"}),
            json!({"status": {"conditions": conditions}}),
        )
    }

    fn app_snapshot(status: Value) -> DynamicObject {
        dynamic(
            "dataservices.nutanix.com/v1alpha1",
            "ApplicationSnapshot",
            json!({"name": "snap", "namespace": "apps"}),
            json!({"status": status}),
        )
    }

    #[test]
    fn test_application_state() {
        assert_eq!(application_state(&app(json!([{"type": "Active", "status": "True"}]))), "Active");
        assert_eq!(application_state(&app(json!([{"type": "Active", "status": "False"}]))), "Inactive");
        assert_eq!(application_state(&app(json!([{"type": "Ready", "status": "True"}]))), "Ready");
        assert_eq!(application_state(&app(json!([{"type": "Ready", "status": "False"}]))), "NotReady");
        assert_eq!(
            application_state(&app(json!([
                {"type": "Progressing", "status": "True"},
                {"type": "Active", "status": "True"}
            ]))),
            "Active"
        );
        assert_eq!(application_state(&app(json!([]))), "Unknown");
        assert_eq!(application_state(&app(Value::Null)), "Unknown");
    }

    #[test]
    fn test_snapshot_state() {
        assert_eq!(snapshot_state(&app_snapshot(json!({"readyToUse": true}))), "Ready");
        assert_eq!(snapshot_state(&app_snapshot(json!({"readyToUse": false}))), "Not Ready");
        assert_eq!(snapshot_state(&app_snapshot(json!({}))), "Unknown");
    }

    #[test]
    fn test_pod_record_fields() {
        let mut snapshot = Snapshot::default();
        snapshot.pods.push(object(json!({
            "metadata": {
                "name": "web-1",
                "namespace": "shop",
                "creationTimestamp": "2024-01-02T03:04:05Z",
                "ownerReferences": [owner("ReplicaSet", "web-abc")]
            },
            "spec": {"nodeName": "node-a", "containers": [{"name": "a"}, {"name": "b"}]},
            "status": {
                "phase": "Running",
                "containerStatuses": [
                    {"name": "a", "ready": true, "restartCount": 2, "image": "x", "imageID": ""},
                    {"name": "b", "ready": false, "restartCount": 1, "image": "y", "imageID": ""}
                ]
            }
        })));
        snapshot.pods.push(pod("pending", "shop"));

        let response = assemble(&snapshot, &classify(&snapshot));
        let web = &response.pods[0];

        assert_eq!(web.status, "Running");
        assert_eq!(web.ready, "1/2");
        assert_eq!(web.restarts, 3);
        assert_eq!(web.node, "node-a");
        assert_eq!(web.owner_kind.as_deref(), Some("ReplicaSet"));
        assert_eq!(web.owner_name.as_deref(), Some("web-abc"));
        assert_eq!(web.meta.age, "2024-01-02T03:04:05+00:00");
        assert_eq!(web.meta.flags.orphaned, Some(false));

        let pending = &response.pods[1];
        assert_eq!(pending.node, "Pending");
        assert_eq!(pending.ready, "0/0");
        assert_eq!(pending.meta.flags.orphaned, Some(true));
        assert!(pending.owner_name.is_none());
    }

    #[test]
    fn test_storage_record_defaults() {
        let mut snapshot = Snapshot::default();
        snapshot.pvcs.push(object(json!({"metadata": {"name": "claim", "namespace": "ns"}})));
        snapshot.pvs.push(object(json!({
            "metadata": {"name": "pv-1"},
            "spec": {
                "capacity": {"storage": "10Gi"},
                "accessModes": ["ReadWriteOnce", "ReadOnlyMany"],
                "persistentVolumeReclaimPolicy": "Retain",
                "claimRef": {"name": "claim", "namespace": "ns"}
            },
            "status": {"phase": "Bound"}
        })));

        let response = assemble(&snapshot, &classify(&snapshot));

        let pvc = &response.pvcs[0];
        assert_eq!(pvc.volume, "Pending");
        assert_eq!(pvc.capacity, "Pending");
        assert_eq!(pvc.storage_class, "default");
        assert_eq!(pvc.meta.flags.orphaned, Some(true));

        let pv = &response.pvs[0];
        assert_eq!(pv.capacity, "10Gi");
        assert_eq!(pv.access_modes, "ReadWriteOnce,ReadOnlyMany");
        assert_eq!(pv.reclaim_policy, "Retain");
        assert_eq!(pv.claim, "claim");
        assert_eq!(pv.claim_namespace, "ns");
        assert_eq!(pv.meta.flags.orphaned, Some(false));
    }

    #[test]
    fn test_service_record_fields() {
        let mut snapshot = Snapshot::default();
        snapshot.services.push(object(json!({
            "metadata": {"name": "lb", "namespace": "ns"},
            "spec": {
                "type": "LoadBalancer",
                "clusterIP": "10.0.0.10",
                "ports": [{"port": 80, "protocol": "TCP"}, {"port": 53, "protocol": "UDP"}]
            },
            "status": {"loadBalancer": {"ingress": [{"ip": "203.0.113.7"}]}}
        })));

        let response = assemble(&snapshot, &classify(&snapshot));
        let svc = &response.services[0];

        assert_eq!(svc.service_type, "LoadBalancer");
        assert_eq!(svc.cluster_ip, "10.0.0.10");
        assert_eq!(svc.external_ip, "203.0.113.7");
        assert_eq!(svc.ports, "80/TCP,53/UDP");
        assert_eq!(svc.meta.flags.orphaned, Some(true));
    }

    #[test]
    fn test_workload_replica_strings() {
        let mut snapshot = Snapshot::default();
        let mut web = deployment("web", "shop", Some(3));
        web.status = Some(object(json!({"readyReplicas": 2})));
        snapshot.deployments.push(web);
        snapshot.statefulsets.push(statefulset("db", "shop", None));

        let response = assemble(&snapshot, &classify(&snapshot));

        assert_eq!(response.deployments[0].replicas, "2/3");
        assert_eq!(response.deployments[0].kind, "Deployment");
        assert_eq!(response.statefulsets[0].replicas, "0/0");
        assert_eq!(response.statefulsets[0].meta.flags.orphaned, Some(true));
    }

    #[test]
    fn test_custom_resources_and_warnings() {
        let mut snapshot = Snapshot::default();
        snapshot.protection_plans.push(dynamic(
            "dataservices.nutanix.com/v1alpha1",
            "AppProtectionPlan",
            json!({"name": "nightly", "namespace": "apps"}),
            json!({"spec": {"applicationName": "db"}}),
        ));
        snapshot.degraded.push(ResourceKind::VolumeSnapshot);

        let response = assemble(&snapshot, &classify(&snapshot));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(response.protection_plans[0].application, "db");
        assert!(json["protection_plans"][0].get("orphaned").is_none());
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(1));
        assert!(json["pods"].as_array().is_some_and(Vec::is_empty));
    }
}
