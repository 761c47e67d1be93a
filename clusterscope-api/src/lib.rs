//! ClusterScope API Library
//!
//! Cluster inventory with orphan and deletion classification, exposed for the
//! server binary, tests and benchmarks.

// Core modules
pub mod config;
pub mod error;

// Application state
pub mod state;
pub use state::AppState;

// Authentication
pub mod auth;
pub mod middleware;

// Kubernetes inspection
pub mod kubernetes;

// HTTP routes
pub mod routes;

// Logging configuration
pub mod logging;

// Health checks
pub mod health;

// Graceful shutdown handling
pub mod shutdown;
