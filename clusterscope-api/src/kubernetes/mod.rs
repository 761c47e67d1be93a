//! Kubernetes inspection for ClusterScope
//!
//! Provides:
//! - Cluster connection via in-cluster config or kubeconfig
//! - Concurrent snapshots of every inspected kind, cached for a short TTL
//! - Orphan and deletion classification over a snapshot
//! - Inventory and node-centric overview payloads
//! - Replica scaling for Deployments and StatefulSets

pub mod assemble;
pub mod cache;
pub mod classify;
pub mod client;
pub mod deletion;
pub mod error;
pub mod index;
pub mod metadata;
pub mod overview;
pub mod scaling;
pub mod snapshot;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use clusterscope_common::cluster::{ClusterOverview, ReplicaStatus, ScaleResponse};
use clusterscope_common::resources::ResourcesResponse;
use tracing::{debug, info, warn};

use cache::SnapshotCache;
use client::K8sClient;
use error::{K8sError, K8sResult};
use snapshot::{FetchPolicy, Snapshot, SnapshotFetcher};

/// Entry point for every cluster read and write the API performs
///
/// Reads share one cached snapshot; writes invalidate it.
pub struct ClusterInspector {
    client: K8sClient,
    cache: SnapshotCache,
    policy: FetchPolicy,
}

impl ClusterInspector {
    pub fn new(client: K8sClient, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: SnapshotCache::new(cache_ttl),
            policy: FetchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &K8sClient {
        &self.client
    }

    pub fn cluster_name(&self) -> &str {
        self.client.cluster_name()
    }

    /// Current snapshot, served from cache while fresh
    pub async fn snapshot(&self) -> K8sResult<Arc<Snapshot>> {
        if let Some(cached) = self.cache.get(Instant::now()).await {
            debug!("Serving cached snapshot");
            return Ok(cached);
        }

        let generation = self.cache.generation().await;
        let snapshot = SnapshotFetcher::new(&self.client)
            .fetch_all()
            .await
            .settle(&self.policy)?;
        let snapshot = Arc::new(snapshot);
        if !self.cache.put(Arc::clone(&snapshot), Instant::now(), generation).await {
            debug!("Cache invalidated during fetch, snapshot not stored");
        }
        Ok(snapshot)
    }

    /// Drop the cached snapshot and fetch a new one
    pub async fn refresh(&self) -> K8sResult<Arc<Snapshot>> {
        self.cache.invalidate().await;
        let snapshot = self.snapshot().await?;
        info!(
            nodes = snapshot.nodes.len(),
            pods = snapshot.pods.len(),
            "Snapshot refreshed"
        );
        Ok(snapshot)
    }

    /// Classified inventory of the whole cluster
    pub async fn resources(&self) -> K8sResult<ResourcesResponse> {
        let snapshot = self.snapshot().await?;

        tokio::task::spawn_blocking(move || {
            let classification = classify::classify(&snapshot);
            assemble::assemble(&snapshot, &classification)
        })
        .await
        .map_err(|e| K8sError::Internal(format!("Classification task failed: {}", e)))
    }

    /// Node-centric overview; an unreachable cluster yields an empty
    /// overview carrying the error
    pub async fn overview(&self) -> ClusterOverview {
        match self.snapshot().await {
            Ok(snapshot) => overview::build_overview(self.cluster_name(), &snapshot),
            Err(e) => {
                warn!("Failed to build cluster overview: {}", e);
                ClusterOverview::unavailable(self.cluster_name(), e.to_string(), Utc::now().to_rfc3339())
            }
        }
    }

    pub async fn scale(&self, namespace: &str, name: &str, replicas: i32) -> K8sResult<ScaleResponse> {
        let response = scaling::scale_workload(&self.client, namespace, name, replicas).await?;
        self.cache.invalidate().await;
        Ok(response)
    }

    pub async fn replica_status(&self, namespace: &str, name: &str) -> K8sResult<ReplicaStatus> {
        scaling::replica_status(&self.client, namespace, name).await
    }

    pub async fn health_check(&self) -> K8sResult<()> {
        self.client.health_check().await
    }
}
