//! Storage and configuration rules

use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolume, PersistentVolumeClaim, Secret};

use super::is_system_namespace;
use crate::kubernetes::index::SnapshotIndex;
use crate::kubernetes::metadata::ObjectMetadata;

/// Published into every namespace for service account CA verification
const ROOT_CA_CONFIGMAP: &str = "kube-root-ca.crt";

const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";
const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";
const HELM_RELEASE_TYPE: &str = "helm.sh/release.v1";
const DATASERVICES_MARKER: &str = "dataservices.nutanix.com";
const CERT_MANAGER_INJECTION: &str = "cert-manager.io/allow-direct-injection";

const DASHBOARD_NAMESPACE: &str = "kubernetes-dashboard";
const DASHBOARD_OBJECTS: &[&str] = &[
    "kubernetes-dashboard-settings",
    "kubernetes-dashboard-csrf",
    "kubernetes-dashboard-key-holder",
    "kubernetes-dashboard-certs",
];

pub fn is_pvc_orphaned(pvc: &PersistentVolumeClaim, index: &SnapshotIndex<'_>) -> bool {
    !index.claimed_pvcs.contains(pvc.namespace(), pvc.name())
}

pub fn is_pv_orphaned(pv: &PersistentVolume) -> bool {
    pv.status.as_ref().and_then(|s| s.phase.as_deref()) != Some("Bound")
}

/// Markers left by operators, Helm or the dashboard that own a config object
/// without referencing it from a pod
fn is_managed<T: ObjectMetadata + ?Sized>(obj: &T) -> bool {
    if obj.has_owner() {
        return true;
    }

    if obj.label("managed-by") == Some("prometheus-operator")
        || obj.label("alertmanager").is_some()
        || obj.label("prometheus").is_some()
        || obj.has_label_prefix("app.kubernetes.io/")
    {
        return true;
    }

    if obj.namespace() == DASHBOARD_NAMESPACE
        && (DASHBOARD_OBJECTS.contains(&obj.name())
            || obj.label("k8s-app") == Some("kubernetes-dashboard"))
    {
        return true;
    }

    obj.annotation(CERT_MANAGER_INJECTION).is_some()
        || obj
            .finalizers()
            .iter()
            .any(|finalizer| finalizer.contains(DATASERVICES_MARKER))
}

pub fn is_configmap_orphaned(cm: &ConfigMap, index: &SnapshotIndex<'_>) -> bool {
    let (namespace, name) = (cm.namespace(), cm.name());

    if is_system_namespace(namespace) || name == ROOT_CA_CONFIGMAP || is_managed(cm) {
        return false;
    }

    !(index.configmap_refs.contains(namespace, name) || index.env_values.contains(namespace, name))
}

pub fn is_secret_orphaned(secret: &Secret, index: &SnapshotIndex<'_>) -> bool {
    let (namespace, name) = (secret.namespace(), secret.name());
    let secret_type = secret.type_.as_deref().unwrap_or_default();

    if is_system_namespace(namespace) || secret_type == SERVICE_ACCOUNT_TOKEN_TYPE || is_managed(secret) {
        return false;
    }

    if secret_type.contains(DATASERVICES_MARKER) || secret_type == HELM_RELEASE_TYPE {
        return false;
    }

    if secret_type == DOCKER_CONFIG_JSON_TYPE && index.pull_secrets.contains(namespace, name) {
        return false;
    }

    !(index.secret_refs.contains(namespace, name) || index.env_values.contains(namespace, name))
}
