//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with cluster context and helper methods.

use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{info, warn};

use super::error::{K8sError, K8sResult};
use crate::config::KubernetesConfig;

/// Wrapper around kube-rs Client with cluster context
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    cluster_name: String,
    api_server: String,
}

impl K8sClient {
    /// Connect using the configured source
    ///
    /// In-cluster service account first when requested, then an explicit
    /// kubeconfig path, then the usual `KUBECONFIG`/`~/.kube/config` inference.
    pub async fn connect(config: &KubernetesConfig) -> K8sResult<Self> {
        let kube_config = if config.in_cluster {
            Config::incluster().map_err(|e| {
                K8sError::InvalidKubeconfig(format!("Failed to get in-cluster config: {}", e))
            })?
        } else if let Some(path) = &config.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                K8sError::InvalidKubeconfig(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Config::from_custom_kubeconfig(
                kubeconfig,
                &KubeConfigOptions {
                    context: config.context.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?
        } else if config.context.is_some() {
            Config::from_kubeconfig(&KubeConfigOptions {
                context: config.context.clone(),
                ..Default::default()
            })
            .await
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?
        } else {
            Config::infer().await.map_err(|e| {
                K8sError::InvalidKubeconfig(format!("Failed to infer configuration: {}", e))
            })?
        };

        let client = Self::from_config(kube_config, config.cluster_name.clone())?;
        info!(
            cluster = %client.cluster_name,
            api_server = %client.api_server,
            in_cluster = config.in_cluster,
            "Kubernetes client configured"
        );
        Ok(client)
    }

    /// Build a client from an already resolved kube-rs configuration
    pub fn from_config(config: Config, cluster_name: String) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config)
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            cluster_name,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get cluster name
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Check that the API server answers a minimal list request
    pub async fn health_check(&self) -> K8sResult<()> {
        let nodes: Api<Node> = Api::all(self.inner.clone());

        nodes
            .list(&ListParams::default().limit(1))
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!("Cluster health check failed: {}", e);
                K8sError::from(e)
            })
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("cluster_name", &self.cluster_name)
            .field("api_server", &self.api_server)
            .finish()
    }
}
