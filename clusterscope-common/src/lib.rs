//! Common types shared between clusterscope-api and dashboard clients

pub mod auth;
pub mod cluster;
pub mod resources;

pub use resources::{ClassificationResult, ResourceKind};

/// Dashboard login errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid session")]
    InvalidSession,
}

pub type Result<T> = std::result::Result<T, Error>;
