//! Configuration management for ClusterScope
//!
//! Settings are resolved in order of priority:
//! 1. Environment variables (`CLUSTERSCOPE_*`)
//! 2. Configuration file (TOML format)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration struct for ClusterScope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterScopeConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Cluster connection
    pub kubernetes: KubernetesConfig,
    /// Dashboard login
    pub auth: AuthConfig,
    /// Snapshot cache
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    /// Static dashboard assets
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Use the pod's service account instead of a kubeconfig
    pub in_cluster: bool,
    /// Explicit kubeconfig path; inferred from `KUBECONFIG` when unset
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
    /// Display name reported by the overview
    pub cluster_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub username: String,
    pub password: String,
    pub session_timeout_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot lifetime; 0 disables caching
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    pub file_logging_enabled: bool,
    /// Emit JSON lines to the log file
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub static_dir: PathBuf,
}

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9090,
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            in_cluster: false,
            kubeconfig: None,
            context: None,
            cluster_name: "kubernetes".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            session_timeout_hours: 24,
        }
    }
}

impl AuthConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_hours.saturating_mul(3600))
    }

    pub fn uses_default_credentials(&self) -> bool {
        self.username == DEFAULT_USERNAME && self.password == DEFAULT_PASSWORD
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 30 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("/var/log/clusterscope"),
            file_logging_enabled: false,
            json_format: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./static"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ClusterScopeConfig {
    /// Load from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("CLUSTERSCOPE_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/clusterscope/config.toml")),
            Some(PathBuf::from("./clusterscope.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply `CLUSTERSCOPE_*` overrides read through `lookup`
    ///
    /// Values that fail to parse leave the current setting untouched.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("CLUSTERSCOPE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CLUSTERSCOPE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        // Kubernetes
        if let Some(in_cluster) = lookup("CLUSTERSCOPE_IN_CLUSTER").as_deref().and_then(parse_bool) {
            self.kubernetes.in_cluster = in_cluster;
        }
        if let Some(path) = lookup("CLUSTERSCOPE_KUBECONFIG") {
            self.kubernetes.kubeconfig = Some(PathBuf::from(path));
        }
        if let Some(context) = lookup("CLUSTERSCOPE_KUBE_CONTEXT") {
            self.kubernetes.context = Some(context);
        }
        if let Some(name) = lookup("CLUSTERSCOPE_CLUSTER_NAME") {
            self.kubernetes.cluster_name = name;
        }

        // Auth
        if let Some(enabled) = lookup("CLUSTERSCOPE_AUTH_ENABLED").as_deref().and_then(parse_bool) {
            self.auth.enabled = enabled;
        }
        if let Some(username) = lookup("CLUSTERSCOPE_USERNAME") {
            self.auth.username = username;
        }
        if let Some(password) = lookup("CLUSTERSCOPE_PASSWORD") {
            self.auth.password = password;
        }
        if let Some(hours) = lookup("CLUSTERSCOPE_SESSION_TIMEOUT_HOURS").and_then(|v| v.parse().ok()) {
            self.auth.session_timeout_hours = hours;
        }

        // Cache
        if let Some(ttl) = lookup("CLUSTERSCOPE_CACHE_TTL_SECONDS").and_then(|v| v.parse().ok()) {
            self.cache.ttl_seconds = ttl;
        }

        // Logging
        if let Some(level) = lookup("CLUSTERSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = lookup("CLUSTERSCOPE_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
        if let Some(enabled) = lookup("CLUSTERSCOPE_FILE_LOGGING").as_deref().and_then(parse_bool) {
            self.logging.file_logging_enabled = enabled;
        }
        if let Some(json) = lookup("CLUSTERSCOPE_LOG_JSON").as_deref().and_then(parse_bool) {
            self.logging.json_format = json;
        }

        // UI
        if let Some(dir) = lookup("CLUSTERSCOPE_STATIC_DIR") {
            self.ui.static_dir = PathBuf::from(dir);
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        if self.kubernetes.cluster_name.trim().is_empty() {
            return Err(ConfigError::Validation("Cluster name cannot be empty".to_string()));
        }

        if self.auth.enabled {
            if self.auth.username.is_empty() || self.auth.password.is_empty() {
                return Err(ConfigError::Validation(
                    "Username and password are required when auth is enabled".to_string(),
                ));
            }
            if self.auth.session_timeout_hours == 0 {
                return Err(ConfigError::Validation(
                    "Session timeout must be at least one hour".to_string(),
                ));
            }
        }

        if self.kubernetes.in_cluster && self.kubernetes.kubeconfig.is_some() {
            return Err(ConfigError::Validation(
                "in_cluster and kubeconfig are mutually exclusive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Config validation failed: {0}")]
    Validation(String),
}
