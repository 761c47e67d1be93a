//! Health check for the dashboard and its cluster connection

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::kubernetes::ClusterInspector;

/// Overall system health status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub latency_ms: u64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

pub struct HealthChecker {
    start_time: Instant,
    version: String,
}

impl HealthChecker {
    pub fn new(version: &str) -> Self {
        Self {
            start_time: Instant::now(),
            version: version.to_string(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn report(&self, error: Option<String>, started: Instant) -> HealthReport {
        HealthReport {
            status: if error.is_none() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: self.version.clone(),
            uptime_seconds: self.uptime_seconds(),
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Ping the API server with a one-item node list
    pub async fn check(&self, inspector: &ClusterInspector) -> HealthReport {
        let started = Instant::now();
        let error = inspector.health_check().await.err().map(|e| e.to_string());
        self.report(error, started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status_follows_error() {
        let checker = HealthChecker::new("1.2.3");

        let healthy = checker.report(None, Instant::now());
        assert!(healthy.is_healthy());
        assert_eq!(healthy.version, "1.2.3");

        let unhealthy = checker.report(Some("connection refused".to_string()), Instant::now());
        let json = serde_json::to_value(&unhealthy).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "connection refused");
    }

    #[test]
    fn test_healthy_report_omits_error() {
        let checker = HealthChecker::new("1.2.3");
        let json = serde_json::to_value(checker.report(None, Instant::now())).unwrap();

        assert_eq!(json["status"], "healthy");
        assert!(json.get("error").is_none());
    }
}
