//! Cross-reference indices over a snapshot
//!
//! Built once per classification pass so every rule is a set lookup instead
//! of a scan over the referencing kinds.

use std::collections::{BTreeMap, HashMap, HashSet};

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};

use super::metadata::{ObjectMetadata, RefName};
use super::snapshot::Snapshot;

/// Set of `(namespace, name)` pairs
#[derive(Debug, Default)]
pub struct NameSet<'a> {
    by_namespace: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> NameSet<'a> {
    pub fn insert(&mut self, namespace: &'a str, name: &'a str) {
        self.by_namespace.entry(namespace).or_default().insert(name);
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.by_namespace
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }

    pub fn len(&self) -> usize {
        self.by_namespace.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pods of one namespace, as seen by label selectors
pub type PodLabels<'a> = Vec<Option<&'a BTreeMap<String, String>>>;

#[derive(Debug, Default)]
pub struct SnapshotIndex<'a> {
    /// PVC names mounted by any pod
    pub claimed_pvcs: NameSet<'a>,
    /// ConfigMaps referenced by volumes, projections, envFrom or key refs
    pub configmap_refs: NameSet<'a>,
    /// Secrets referenced by volumes, projections, envFrom or key refs
    pub secret_refs: NameSet<'a>,
    /// Literal env values, matched against config names as a last resort
    pub env_values: NameSet<'a>,
    /// Secrets named in service account `imagePullSecrets`
    pub pull_secrets: NameSet<'a>,
    pub pod_service_accounts: NameSet<'a>,
    /// ServiceAccount subjects of RoleBindings and ClusterRoleBindings
    pub bound_service_accounts: NameSet<'a>,
    /// Roles referenced by a RoleBinding in the same namespace
    pub bound_roles: NameSet<'a>,
    /// ClusterRoles referenced by any binding
    pub bound_cluster_roles: HashSet<&'a str>,
    pub roles: NameSet<'a>,
    pub cluster_roles: HashSet<&'a str>,
    /// Endpoints with at least one ready address
    pub ready_endpoints: NameSet<'a>,
    pub deployments: NameSet<'a>,
    pub statefulsets: NameSet<'a>,
    pub replicasets: NameSet<'a>,
    pub pod_labels: HashMap<&'a str, PodLabels<'a>>,
    /// Objects of the kinds that keep a namespace in use
    pub namespace_population: HashMap<&'a str, usize>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut index = SnapshotIndex::default();

        for pod in &snapshot.pods {
            index.index_pod(pod);
        }

        for sa in &snapshot.service_accounts {
            let namespace = sa.namespace();
            for pull in sa.image_pull_secrets.iter().flatten() {
                if let Some(name) = pull.name.ref_name() {
                    index.pull_secrets.insert(namespace, name);
                }
            }
        }

        for rb in &snapshot.role_bindings {
            let namespace = rb.namespace();
            index.index_subjects(rb.subjects.as_deref());
            match rb.role_ref.kind.as_str() {
                "Role" => index.bound_roles.insert(namespace, &rb.role_ref.name),
                "ClusterRole" => {
                    index.bound_cluster_roles.insert(rb.role_ref.name.as_str());
                }
                _ => {}
            }
        }

        for crb in &snapshot.cluster_role_bindings {
            index.index_subjects(crb.subjects.as_deref());
            if crb.role_ref.kind == "ClusterRole" {
                index.bound_cluster_roles.insert(crb.role_ref.name.as_str());
            }
        }

        for role in &snapshot.roles {
            index.roles.insert(role.namespace(), role.name());
        }
        for cr in &snapshot.cluster_roles {
            index.cluster_roles.insert(cr.name());
        }

        for ep in &snapshot.endpoints {
            let ready = ep.subsets.iter().flatten().any(|subset| {
                subset
                    .addresses
                    .as_ref()
                    .is_some_and(|addresses| !addresses.is_empty())
            });
            if ready {
                index.ready_endpoints.insert(ep.namespace(), ep.name());
            }
        }

        for d in &snapshot.deployments {
            index.deployments.insert(d.namespace(), d.name());
        }
        for s in &snapshot.statefulsets {
            index.statefulsets.insert(s.namespace(), s.name());
        }
        for r in &snapshot.replicasets {
            index.replicasets.insert(r.namespace(), r.name());
        }

        let populating = snapshot
            .pods
            .iter()
            .map(|o| o.namespace())
            .chain(snapshot.deployments.iter().map(|o| o.namespace()))
            .chain(snapshot.statefulsets.iter().map(|o| o.namespace()))
            .chain(snapshot.daemonsets.iter().map(|o| o.namespace()))
            .chain(snapshot.configmaps.iter().map(|o| o.namespace()))
            .chain(snapshot.secrets.iter().map(|o| o.namespace()))
            .chain(snapshot.services.iter().map(|o| o.namespace()));
        for namespace in populating {
            *index.namespace_population.entry(namespace).or_insert(0) += 1;
        }

        index
    }

    fn index_pod(&mut self, pod: &'a Pod) {
        let namespace = pod.namespace();
        self.pod_labels
            .entry(namespace)
            .or_default()
            .push(pod.metadata.labels.as_ref());

        let Some(spec) = pod.spec.as_ref() else {
            return;
        };

        if let Some(sa) = spec.service_account_name.ref_name() {
            self.pod_service_accounts.insert(namespace, sa);
        }

        self.index_volumes(namespace, spec);

        let containers = spec
            .containers
            .iter()
            .chain(spec.init_containers.iter().flatten());
        for container in containers {
            self.index_container(namespace, container);
        }
    }

    fn index_volumes(&mut self, namespace: &'a str, spec: &'a PodSpec) {
        for volume in spec.volumes.iter().flatten() {
            if let Some(claim) = &volume.persistent_volume_claim {
                if let Some(name) = claim.claim_name.ref_name() {
                    self.claimed_pvcs.insert(namespace, name);
                }
            }
            if let Some(name) = volume.config_map.as_ref().and_then(|cm| cm.name.ref_name()) {
                self.configmap_refs.insert(namespace, name);
            }
            if let Some(name) = volume.secret.as_ref().and_then(|s| s.secret_name.ref_name()) {
                self.secret_refs.insert(namespace, name);
            }
            let projections = volume
                .projected
                .iter()
                .flat_map(|projected| projected.sources.iter().flatten());
            for source in projections {
                if let Some(name) = source.config_map.as_ref().and_then(|cm| cm.name.ref_name()) {
                    self.configmap_refs.insert(namespace, name);
                }
                if let Some(name) = source.secret.as_ref().and_then(|s| s.name.ref_name()) {
                    self.secret_refs.insert(namespace, name);
                }
            }
        }
    }

    fn index_container(&mut self, namespace: &'a str, container: &'a Container) {
        for source in container.env_from.iter().flatten() {
            if let Some(name) = source.config_map_ref.as_ref().and_then(|r| r.name.ref_name()) {
                self.configmap_refs.insert(namespace, name);
            }
            if let Some(name) = source.secret_ref.as_ref().and_then(|r| r.name.ref_name()) {
                self.secret_refs.insert(namespace, name);
            }
        }

        for var in container.env.iter().flatten() {
            match &var.value_from {
                Some(from) => {
                    if let Some(name) = from.config_map_key_ref.as_ref().and_then(|r| r.name.ref_name()) {
                        self.configmap_refs.insert(namespace, name);
                    }
                    if let Some(name) = from.secret_key_ref.as_ref().and_then(|r| r.name.ref_name()) {
                        self.secret_refs.insert(namespace, name);
                    }
                }
                None => {
                    if let Some(value) = var.value.ref_name() {
                        self.env_values.insert(namespace, value);
                    }
                }
            }
        }
    }

    fn index_subjects(&mut self, subjects: Option<&'a [k8s_openapi::api::rbac::v1::Subject]>) {
        for subject in subjects.into_iter().flatten() {
            if subject.kind != "ServiceAccount" {
                continue;
            }
            if let Some(namespace) = subject.namespace.ref_name() {
                self.bound_service_accounts.insert(namespace, &subject.name);
            }
        }
    }

    /// Whether an object of `kind` named `name` exists in `namespace`
    pub fn scale_target_exists(&self, kind: &str, namespace: &str, name: &str) -> bool {
        match kind {
            "Deployment" => self.deployments.contains(namespace, name),
            "StatefulSet" => self.statefulsets.contains(namespace, name),
            "ReplicaSet" => self.replicasets.contains(namespace, name),
            _ => false,
        }
    }

    pub fn pods_in(&self, namespace: &str) -> &[Option<&'a BTreeMap<String, String>>] {
        self.pod_labels
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::fixtures::*;

    #[test]
    fn test_pod_references_are_indexed() {
        let mut snapshot = Snapshot::default();
        snapshot.pods.push(pod_with_spec(
            "web-0",
            "shop",
            serde_json::json!({
                "serviceAccountName": "web",
                "volumes": [
                    {"name": "data", "persistentVolumeClaim": {"claimName": "data-web-0"}},
                    {"name": "cfg", "configMap": {"name": "web-config"}},
                    {"name": "tls", "secret": {"secretName": "web-tls"}},
                    {"name": "bundle", "projected": {"sources": [
                        {"configMap": {"name": "ca-bundle"}},
                        {"secret": {"name": "projected-token"}}
                    ]}}
                ],
                "initContainers": [{
                    "name": "init",
                    "envFrom": [{"secretRef": {"name": "init-env"}}]
                }],
                "containers": [{
                    "name": "app",
                    "envFrom": [{"configMapRef": {"name": "app-env"}}],
                    "env": [
                        {"name": "DB_PASS", "valueFrom": {"secretKeyRef": {"name": "db", "key": "pw"}}},
                        {"name": "MODE", "valueFrom": {"configMapKeyRef": {"name": "modes", "key": "m"}}},
                        {"name": "CONFIG_NAME", "value": "runtime-config"}
                    ]
                }]
            }),
        ));

        let index = SnapshotIndex::build(&snapshot);

        assert!(index.claimed_pvcs.contains("shop", "data-web-0"));
        assert!(index.pod_service_accounts.contains("shop", "web"));
        for name in ["web-config", "ca-bundle", "app-env", "modes"] {
            assert!(index.configmap_refs.contains("shop", name), "{}", name);
        }
        for name in ["web-tls", "projected-token", "init-env", "db"] {
            assert!(index.secret_refs.contains("shop", name), "{}", name);
        }
        assert!(index.env_values.contains("shop", "runtime-config"));
        assert!(!index.configmap_refs.contains("other", "web-config"));
        assert_eq!(index.namespace_population.get("shop"), Some(&1));
    }

    #[test]
    fn test_rbac_references_are_indexed() {
        let mut snapshot = Snapshot::default();
        snapshot.role_bindings.push(role_binding(
            "rb",
            "team",
            "Role",
            "reader",
            &[("ServiceAccount", "bot", Some("team")), ("User", "alice", None)],
        ));
        snapshot.cluster_role_bindings.push(cluster_role_binding(
            "crb",
            "view",
            &[("ServiceAccount", "auditor", Some("ops"))],
        ));

        let index = SnapshotIndex::build(&snapshot);

        assert!(index.bound_roles.contains("team", "reader"));
        assert!(index.bound_cluster_roles.contains("view"));
        assert!(index.bound_service_accounts.contains("team", "bot"));
        assert!(index.bound_service_accounts.contains("ops", "auditor"));
        assert_eq!(index.bound_service_accounts.len(), 2);
    }

    #[test]
    fn test_endpoints_need_ready_addresses() {
        let mut snapshot = Snapshot::default();
        snapshot.endpoints.push(endpoints("live", "ns", &["10.0.0.1"]));
        snapshot.endpoints.push(endpoints("idle", "ns", &[]));

        let index = SnapshotIndex::build(&snapshot);

        assert!(index.ready_endpoints.contains("ns", "live"));
        assert!(!index.ready_endpoints.contains("ns", "idle"));
    }
}
