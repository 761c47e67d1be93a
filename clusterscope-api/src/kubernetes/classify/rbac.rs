//! RBAC rules

use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding, RoleRef, Subject};

use super::is_system_namespace;
use crate::kubernetes::index::SnapshotIndex;
use crate::kubernetes::metadata::ObjectMetadata;

/// ClusterRole name prefixes reserved for platform components
const PLATFORM_ROLE_PREFIXES: &[&str] = &["system:", "cluster-"];

pub fn is_service_account_orphaned(sa: &ServiceAccount, index: &SnapshotIndex<'_>) -> bool {
    let (namespace, name) = (sa.namespace(), sa.name());

    if is_system_namespace(namespace) || name == "default" {
        return false;
    }

    !(index.pod_service_accounts.contains(namespace, name)
        || index.bound_service_accounts.contains(namespace, name))
}

pub fn is_role_orphaned(role: &Role, index: &SnapshotIndex<'_>) -> bool {
    !index.bound_roles.contains(role.namespace(), role.name())
}

pub fn is_cluster_role_orphaned(role: &ClusterRole, index: &SnapshotIndex<'_>) -> bool {
    let name = role.name();
    if PLATFORM_ROLE_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return false;
    }
    !index.bound_cluster_roles.contains(name)
}

fn has_subjects(subjects: Option<&[Subject]>) -> bool {
    subjects.is_some_and(|subjects| !subjects.is_empty())
}

fn role_ref_exists(role_ref: &RoleRef, namespace: &str, index: &SnapshotIndex<'_>) -> bool {
    match role_ref.kind.as_str() {
        "Role" => index.roles.contains(namespace, &role_ref.name),
        "ClusterRole" => index.cluster_roles.contains(role_ref.name.as_str()),
        _ => false,
    }
}

/// Orphaned when it binds nobody or its role is gone
pub fn is_role_binding_orphaned(rb: &RoleBinding, index: &SnapshotIndex<'_>) -> bool {
    !has_subjects(rb.subjects.as_deref()) || !role_ref_exists(&rb.role_ref, rb.namespace(), index)
}

pub fn is_cluster_role_binding_orphaned(crb: &ClusterRoleBinding, index: &SnapshotIndex<'_>) -> bool {
    !has_subjects(crb.subjects.as_deref())
        || crb.role_ref.kind != "ClusterRole"
        || !role_ref_exists(&crb.role_ref, "", index)
}
