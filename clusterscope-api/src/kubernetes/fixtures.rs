//! Object builders for unit tests

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{ConfigMap, Endpoints, Pod, Secret};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleBinding};
use kube::api::DynamicObject;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub fn object<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture must deserialize")
}

pub fn owner(kind: &str, name: &str) -> Value {
    json!({"apiVersion": "apps/v1", "kind": kind, "name": name, "uid": format!("uid-{}", name)})
}

pub fn pod(name: &str, namespace: &str) -> Pod {
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "spec": {"containers": [{"name": "main"}]}
    }))
}

pub fn pod_with_spec(name: &str, namespace: &str, mut spec: Value) -> Pod {
    if spec.get("containers").is_none() {
        spec["containers"] = json!([{"name": "main"}]);
    }
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "spec": spec
    }))
}

pub fn labeled_pod(name: &str, namespace: &str, labels: Value) -> Pod {
    object(json!({
        "metadata": {"name": name, "namespace": namespace, "labels": labels},
        "spec": {"containers": [{"name": "main"}]}
    }))
}

fn workload_spec(replicas: Option<i32>) -> Value {
    let mut spec = json!({
        "selector": {"matchLabels": {"app": "x"}},
        "serviceName": "x",
        "template": {"metadata": {"labels": {"app": "x"}}}
    });
    if let Some(replicas) = replicas {
        spec["replicas"] = json!(replicas);
    }
    spec
}

pub fn deployment(name: &str, namespace: &str, replicas: Option<i32>) -> Deployment {
    let mut spec = workload_spec(replicas);
    if let Some(obj) = spec.as_object_mut() {
        obj.remove("serviceName");
    }
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "spec": spec
    }))
}

pub fn statefulset(name: &str, namespace: &str, replicas: Option<i32>) -> StatefulSet {
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "spec": workload_spec(replicas)
    }))
}

pub fn configmap(name: &str, namespace: &str) -> ConfigMap {
    object(json!({"metadata": {"name": name, "namespace": namespace}}))
}

pub fn configmap_with_meta(metadata: Value) -> ConfigMap {
    object(json!({"metadata": metadata}))
}

pub fn secret(name: &str, namespace: &str, secret_type: Option<&str>) -> Secret {
    let mut value = json!({"metadata": {"name": name, "namespace": namespace}});
    if let Some(secret_type) = secret_type {
        value["type"] = json!(secret_type);
    }
    object(value)
}

pub fn secret_with_meta(metadata: Value) -> Secret {
    object(json!({"metadata": metadata}))
}

fn subjects(entries: &[(&str, &str, Option<&str>)]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(kind, name, namespace)| {
                let mut subject = json!({"kind": kind, "name": name});
                if let Some(namespace) = namespace {
                    subject["namespace"] = json!(namespace);
                }
                subject
            })
            .collect(),
    )
}

pub fn role_binding(
    name: &str,
    namespace: &str,
    role_kind: &str,
    role_name: &str,
    entries: &[(&str, &str, Option<&str>)],
) -> RoleBinding {
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": role_kind, "name": role_name},
        "subjects": subjects(entries)
    }))
}

pub fn cluster_role_binding(
    name: &str,
    role_name: &str,
    entries: &[(&str, &str, Option<&str>)],
) -> ClusterRoleBinding {
    object(json!({
        "metadata": {"name": name},
        "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "ClusterRole", "name": role_name},
        "subjects": subjects(entries)
    }))
}

pub fn endpoints(name: &str, namespace: &str, ips: &[&str]) -> Endpoints {
    let addresses: Vec<Value> = ips.iter().map(|ip| json!({"ip": ip})).collect();
    object(json!({
        "metadata": {"name": name, "namespace": namespace},
        "subsets": [{"addresses": addresses}]
    }))
}

pub fn dynamic(api_version: &str, kind: &str, metadata: Value, body: Value) -> DynamicObject {
    let mut value = json!({"apiVersion": api_version, "kind": kind, "metadata": metadata});
    if let (Some(target), Some(fields)) = (value.as_object_mut(), body.as_object()) {
        for (key, field) in fields {
            target.insert(key.clone(), field.clone());
        }
    }
    object(value)
}
