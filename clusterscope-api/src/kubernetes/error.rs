//! Kubernetes error types and ApiError mapping
//!
//! Maps kube-rs errors to API errors for consistent error handling.

use crate::error::ApiError;
use clusterscope_common::ResourceKind;
use thiserror::Error;

/// A single list call that failed while building a snapshot
#[derive(Debug, Error)]
#[error("Failed to list {kind}: {source}")]
pub struct FetchError {
    pub kind: ResourceKind,
    #[source]
    pub source: kube::Error,
}

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// Kubernetes resource not found
    #[error("Resource not found: {kind}/{name} in namespace {namespace}")]
    ResourceNotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// A required kind could not be listed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Invalid kubeconfig or in-cluster environment
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Whether a kube-rs error is a 404 from the API server
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

fn map_kube_error(err: &kube::Error) -> ApiError {
    match err {
        kube::Error::Api(resp) => match resp.code {
            401 => ApiError::AuthenticationFailed,
            403 => ApiError::Forbidden(resp.message.clone()),
            404 => ApiError::NotFound(resp.message.clone()),
            409 => ApiError::Conflict(resp.message.clone()),
            422 => ApiError::ValidationError(resp.message.clone()),
            _ => ApiError::Internal(format!("Kubernetes error: {}", err)),
        },
        _ => ApiError::ServiceUnavailable(format!("Kubernetes API unreachable: {}", err)),
    }
}

impl From<K8sError> for ApiError {
    fn from(err: K8sError) -> Self {
        match err {
            K8sError::ResourceNotFound {
                kind,
                name,
                namespace,
            } => ApiError::NotFound(format!(
                "{} {} not found in namespace {}",
                kind, name, namespace
            )),
            K8sError::KubeError(e) => map_kube_error(&e),
            K8sError::Fetch(e) => ApiError::ServiceUnavailable(e.to_string()),
            K8sError::InvalidKubeconfig(msg) => ApiError::ValidationError(msg),
            K8sError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("status {}", code),
            reason: "Test".to_string(),
            code,
        })
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(&api_error(404)));
        assert!(!is_not_found(&api_error(403)));
        assert!(!is_not_found(&api_error(500)));
    }

    #[test]
    fn test_status_code_mapping() {
        let cases = [(401, 401), (403, 403), (404, 404), (409, 409), (422, 422), (500, 500)];
        for (code, expected) in cases {
            let api_err: ApiError = K8sError::KubeError(api_error(code)).into();
            assert_eq!(api_err.to_error_response().status, expected, "code {}", code);
        }
    }

    #[test]
    fn test_fetch_error_is_unavailable() {
        let err = K8sError::Fetch(FetchError {
            kind: ResourceKind::Pod,
            source: api_error(500),
        });
        let response = ApiError::from(err).to_error_response();
        assert_eq!(response.status, 503);
        assert!(response.message.contains("Pod"));
    }
}
