//! Namespace, autoscaler and disruption budget rules

use std::collections::BTreeMap;

use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;

use super::is_system_namespace;
use crate::kubernetes::index::SnapshotIndex;
use crate::kubernetes::metadata::ObjectMetadata;

pub fn is_hpa_orphaned(hpa: &HorizontalPodAutoscaler, index: &SnapshotIndex<'_>) -> bool {
    match hpa.spec.as_ref().map(|spec| &spec.scale_target_ref) {
        Some(target) => !index.scale_target_exists(&target.kind, hpa.namespace(), &target.name),
        None => true,
    }
}

fn selector_matches(selector: &BTreeMap<String, String>, labels: Option<&BTreeMap<String, String>>) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.and_then(|labels| labels.get(key)) == Some(value))
}

/// Orphaned unless some pod in its namespace carries every `matchLabels` pair
///
/// `matchExpressions` are not evaluated. A budget without a selector selects
/// nothing.
pub fn is_pdb_orphaned(pdb: &PodDisruptionBudget, index: &SnapshotIndex<'_>) -> bool {
    let Some(selector) = pdb.spec.as_ref().and_then(|spec| spec.selector.as_ref()) else {
        return true;
    };
    let empty = BTreeMap::new();
    let match_labels = selector.match_labels.as_ref().unwrap_or(&empty);

    !index
        .pods_in(pdb.namespace())
        .iter()
        .any(|labels| selector_matches(match_labels, *labels))
}

/// Orphaned when empty, unless it is a system namespace
///
/// `default` gets no exemption.
pub fn is_namespace_orphaned(ns: &Namespace, index: &SnapshotIndex<'_>) -> bool {
    let name = ns.name();
    if is_system_namespace(name) {
        return false;
    }
    index.namespace_population.get(name).copied().unwrap_or(0) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::fixtures::*;
    use crate::kubernetes::snapshot::Snapshot;
    use serde_json::json;

    fn hpa(namespace: &str, kind: &str, target: &str) -> HorizontalPodAutoscaler {
        object(json!({
            "metadata": {"name": "scaler", "namespace": namespace},
            "spec": {
                "maxReplicas": 5,
                "scaleTargetRef": {"apiVersion": "apps/v1", "kind": kind, "name": target}
            }
        }))
    }

    fn pdb(spec: serde_json::Value) -> PodDisruptionBudget {
        object(json!({"metadata": {"name": "budget", "namespace": "shop"}, "spec": spec}))
    }

    fn namespace(name: &str) -> Namespace {
        object(json!({"metadata": {"name": name}}))
    }

    #[test]
    fn test_hpa_target_must_exist() {
        let mut snapshot = Snapshot::default();
        snapshot.deployments.push(deployment("web", "shop", Some(2)));
        snapshot.statefulsets.push(statefulset("db", "shop", Some(1)));
        let index = SnapshotIndex::build(&snapshot);

        assert!(!is_hpa_orphaned(&hpa("shop", "Deployment", "web"), &index));
        assert!(!is_hpa_orphaned(&hpa("shop", "StatefulSet", "db"), &index));
        assert!(is_hpa_orphaned(&hpa("shop", "StatefulSet", "web"), &index));
        assert!(is_hpa_orphaned(&hpa("other", "Deployment", "web"), &index));
        assert!(is_hpa_orphaned(&hpa("shop", "Rollout", "web"), &index));
    }

    #[test]
    fn test_pdb_selector_matching() {
        let mut snapshot = Snapshot::default();
        snapshot
            .pods
            .push(labeled_pod("web-1", "shop", json!({"app": "web", "tier": "front"})));
        snapshot.pods.push(labeled_pod("db-1", "other", json!({"app": "db"})));
        let index = SnapshotIndex::build(&snapshot);

        let matching = pdb(json!({"selector": {"matchLabels": {"app": "web"}}}));
        let exact = pdb(json!({"selector": {"matchLabels": {"app": "web", "tier": "front"}}}));
        let mismatched = pdb(json!({"selector": {"matchLabels": {"app": "web", "tier": "back"}}}));
        let other_namespace = pdb(json!({"selector": {"matchLabels": {"app": "db"}}}));

        assert!(!is_pdb_orphaned(&matching, &index));
        assert!(!is_pdb_orphaned(&exact, &index));
        assert!(is_pdb_orphaned(&mismatched, &index));
        assert!(is_pdb_orphaned(&other_namespace, &index));
    }

    #[test]
    fn test_pdb_selector_edge_cases() {
        let mut snapshot = Snapshot::default();
        snapshot.pods.push(pod("unlabeled", "shop"));
        let index = SnapshotIndex::build(&snapshot);

        assert!(is_pdb_orphaned(&pdb(json!({"minAvailable": 1})), &index));
        assert!(!is_pdb_orphaned(&pdb(json!({"selector": {}})), &index));

        let empty = Snapshot::default();
        let empty_index = SnapshotIndex::build(&empty);
        assert!(is_pdb_orphaned(&pdb(json!({"selector": {}})), &empty_index));
    }

    #[test]
    fn test_namespace_population() {
        let mut snapshot = Snapshot::default();
        snapshot.configmaps.push(configmap("settings", "busy"));
        let index = SnapshotIndex::build(&snapshot);

        assert!(!is_namespace_orphaned(&namespace("busy"), &index));
        assert!(is_namespace_orphaned(&namespace("empty"), &index));
        assert!(is_namespace_orphaned(&namespace("default"), &index));
        assert!(!is_namespace_orphaned(&namespace("kube-system"), &index));
    }

    #[test]
    fn test_namespace_ignores_uncounted_kinds() {
        let mut snapshot = Snapshot::default();
        snapshot.pvcs.push(object(json!({"metadata": {"name": "data", "namespace": "storage-only"}})));
        let index = SnapshotIndex::build(&snapshot);

        assert!(is_namespace_orphaned(&namespace("storage-only"), &index));
    }
}
