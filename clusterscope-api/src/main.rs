//! ClusterScope API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clusterscope_api::config::ClusterScopeConfig;
use clusterscope_api::kubernetes::client::K8sClient;
use clusterscope_api::shutdown::ShutdownCoordinator;
use clusterscope_api::{logging, routes, AppState};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// How often expired dashboard sessions are dropped
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

fn spawn_session_purge(state: Arc<AppState>, shutdown: ShutdownCoordinator) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = state.auth_manager.purge_expired(chrono::Utc::now()).await;
                    if purged > 0 {
                        debug!(purged, "Purged expired sessions");
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClusterScopeConfig::load().context("Failed to load configuration")?;
    let _log_guard = logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }
    info!("Configuration loaded successfully");

    let client = K8sClient::connect(&config.kubernetes)
        .await
        .context("Failed to configure Kubernetes client")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, client));

    let shutdown = ShutdownCoordinator::new();
    spawn_session_purge(Arc::clone(&state), shutdown.clone());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.wait_for_signal().await });
    }

    let app = routes::build_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("ClusterScope listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
