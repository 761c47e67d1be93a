//! Application State
//!
//! Shared state for the ClusterScope API server

use crate::auth::AuthManager;
use crate::config::ClusterScopeConfig;
use crate::health::HealthChecker;
use crate::kubernetes::client::K8sClient;
use crate::kubernetes::ClusterInspector;

/// Shared application state, handed to handlers as `Arc<AppState>`
pub struct AppState {
    pub config: ClusterScopeConfig,
    pub inspector: ClusterInspector,
    pub auth_manager: AuthManager,
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(config: ClusterScopeConfig, client: K8sClient) -> Self {
        Self {
            inspector: ClusterInspector::new(client, config.cache.ttl()),
            auth_manager: AuthManager::new(&config.auth),
            health: HealthChecker::new(env!("CARGO_PKG_VERSION")),
            config,
        }
    }
}
