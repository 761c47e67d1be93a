//! Shared snapshot builders for integration tests and benchmarks

#![allow(dead_code)]

use clusterscope_api::kubernetes::snapshot::Snapshot;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, Endpoints, Namespace, PersistentVolumeClaim, Pod, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use kube::api::DynamicObject;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub fn create_test_object<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("test object must deserialize")
}

fn meta(name: &str, namespace: &str) -> Value {
    json!({"name": name, "namespace": namespace, "creationTimestamp": "2024-03-01T12:00:00Z"})
}

pub fn create_test_namespace(name: &str) -> Namespace {
    create_test_object(json!({
        "metadata": {"name": name},
        "status": {"phase": "Active"}
    }))
}

pub fn create_test_deployment(name: &str, namespace: &str, replicas: i32) -> Deployment {
    create_test_deployment_with_status(name, namespace, replicas, replicas)
}

/// Deployment whose ready count differs from the desired count
pub fn create_test_deployment_with_status(name: &str, namespace: &str, desired: i32, ready: i32) -> Deployment {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "spec": {
            "replicas": desired,
            "selector": {"matchLabels": {"app": name}},
            "template": {"metadata": {"labels": {"app": name}}}
        },
        "status": {"replicas": ready, "readyReplicas": ready}
    }))
}

pub fn create_test_statefulset(name: &str, namespace: &str, desired: i32, ready: i32) -> StatefulSet {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "spec": {
            "replicas": desired,
            "serviceName": name,
            "selector": {"matchLabels": {"app": name}},
            "template": {"metadata": {"labels": {"app": name}}}
        },
        "status": {"replicas": ready, "readyReplicas": ready}
    }))
}

pub fn create_test_replicaset(name: &str, namespace: &str, owner: Option<&str>) -> ReplicaSet {
    let mut metadata = meta(name, namespace);
    if let Some(owner) = owner {
        metadata["ownerReferences"] = json!([{
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "name": owner,
            "uid": format!("uid-{}", owner)
        }]);
    }
    create_test_object(json!({
        "metadata": metadata,
        "spec": {"selector": {"matchLabels": {"app": name}}}
    }))
}

/// Running pod owned by `owner` that mounts the given config objects and claim
pub fn create_test_pod(
    name: &str,
    namespace: &str,
    owner: &str,
    configmap: Option<&str>,
    secret: Option<&str>,
    claim: Option<&str>,
) -> Pod {
    let mut volumes = Vec::new();
    if let Some(cm) = configmap {
        volumes.push(json!({"name": "config", "configMap": {"name": cm}}));
    }
    if let Some(secret) = secret {
        volumes.push(json!({"name": "creds", "secret": {"secretName": secret}}));
    }
    if let Some(claim) = claim {
        volumes.push(json!({"name": "data", "persistentVolumeClaim": {"claimName": claim}}));
    }

    let mut metadata = meta(name, namespace);
    metadata["labels"] = json!({"app": owner});
    metadata["ownerReferences"] = json!([{
        "apiVersion": "apps/v1",
        "kind": "ReplicaSet",
        "name": owner,
        "uid": format!("uid-{}", owner)
    }]);

    create_test_object(json!({
        "metadata": metadata,
        "spec": {
            "nodeName": "worker-1",
            "serviceAccountName": format!("{}-sa", owner),
            "containers": [{"name": "main", "image": "nginx:1.27"}],
            "volumes": volumes
        },
        "status": {
            "phase": "Running",
            "containerStatuses": [{
                "name": "main",
                "image": "nginx:1.27",
                "imageID": "",
                "ready": true,
                "restartCount": 0
            }]
        }
    }))
}

pub fn create_test_service(name: &str, namespace: &str) -> Service {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "spec": {"type": "ClusterIP", "clusterIP": "10.96.0.10", "ports": [{"port": 80, "protocol": "TCP"}]}
    }))
}

pub fn create_test_endpoints(name: &str, namespace: &str, addresses: &[&str]) -> Endpoints {
    let addresses: Vec<Value> = addresses.iter().map(|ip| json!({"ip": ip})).collect();
    create_test_object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "subsets": [{"addresses": addresses}]
    }))
}

pub fn create_test_configmap(name: &str, namespace: &str) -> ConfigMap {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "data": {"settings.yaml": "debug: false"}
    }))
}

pub fn create_test_secret(name: &str, namespace: &str, secret_type: &str) -> Secret {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "type": secret_type
    }))
}

pub fn create_test_pvc(name: &str, namespace: &str) -> PersistentVolumeClaim {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "spec": {"accessModes": ["ReadWriteOnce"]},
        "status": {"phase": "Bound"}
    }))
}

pub fn create_test_service_account(name: &str, namespace: &str) -> ServiceAccount {
    create_test_object(json!({"metadata": meta(name, namespace)}))
}

pub fn create_test_role(name: &str, namespace: &str) -> Role {
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "rules": [{"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"]}]
    }))
}

pub fn create_test_cluster_role(name: &str) -> ClusterRole {
    create_test_object(json!({
        "metadata": {"name": name},
        "rules": [{"apiGroups": [""], "resources": ["nodes"], "verbs": ["get"]}]
    }))
}

pub fn create_test_role_binding(
    name: &str,
    namespace: &str,
    role_kind: &str,
    role: &str,
    service_account: Option<&str>,
) -> RoleBinding {
    let subjects: Vec<Value> = service_account
        .map(|sa| json!({"kind": "ServiceAccount", "name": sa, "namespace": namespace}))
        .into_iter()
        .collect();
    create_test_object(json!({
        "metadata": meta(name, namespace),
        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": role_kind, "name": role},
        "subjects": subjects
    }))
}

pub fn create_test_cluster_role_binding(name: &str, role: &str, subject: (&str, &str)) -> ClusterRoleBinding {
    create_test_object(json!({
        "metadata": {"name": name},
        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": role},
        "subjects": [{"kind": "ServiceAccount", "namespace": subject.0, "name": subject.1}]
    }))
}

pub fn create_test_application(name: &str, namespace: &str, ready: bool) -> DynamicObject {
    let status = if ready { "True" } else { "False" };
    create_test_object(json!({
        "apiVersion": "dataservices.nutanix.com/v1alpha1",
        "kind": "Application",
        "metadata": meta(name, namespace),
        "status": {"conditions": [{"type": "Ready", "status": status}]}
    }))
}

/// One fully wired application in `namespace`: a deployment with its replica
/// set and pod, plus everything the pod references
pub fn populate_namespace(snapshot: &mut Snapshot, namespace: &str, app: &str) {
    let rs = format!("{}-7d9f", app);
    let cm = format!("{}-config", app);
    let secret = format!("{}-creds", app);
    let claim = format!("{}-data", app);
    let sa = format!("{}-sa", rs);

    snapshot.namespaces.push(create_test_namespace(namespace));
    snapshot.deployments.push(create_test_deployment(app, namespace, 1));
    snapshot.replicasets.push(create_test_replicaset(&rs, namespace, Some(app)));
    snapshot.pods.push(create_test_pod(
        &format!("{}-x1", rs),
        namespace,
        &rs,
        Some(&cm),
        Some(&secret),
        Some(&claim),
    ));
    snapshot.services.push(create_test_service(app, namespace));
    snapshot.endpoints.push(create_test_endpoints(app, namespace, &["10.244.0.7"]));
    snapshot.configmaps.push(create_test_configmap(&cm, namespace));
    snapshot.secrets.push(create_test_secret(&secret, namespace, "Opaque"));
    snapshot.pvcs.push(create_test_pvc(&claim, namespace));
    snapshot.service_accounts.push(create_test_service_account(&sa, namespace));
    snapshot.roles.push(create_test_role(&format!("{}-reader", app), namespace));
    snapshot.role_bindings.push(create_test_role_binding(
        &format!("{}-reader", app),
        namespace,
        "Role",
        &format!("{}-reader", app),
        Some(&sa),
    ));
}

/// Synthetic cluster with `namespaces` populated namespaces
pub fn create_test_cluster(namespaces: usize) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for i in 0..namespaces {
        populate_namespace(&mut snapshot, &format!("team-{}", i), "web");
    }
    snapshot
}
