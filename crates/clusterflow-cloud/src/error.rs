//! Cloud provider error types

use thiserror::Error;

/// Errors surfaced through the provider-independent actuator interface
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Cluster {key} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },

    #[error("Invalid provider spec for cluster {cluster}: {reason}")]
    InvalidProviderSpec { cluster: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State error: {0}")]
    StateError(String),

    /// Provider-specific failure, displayed verbatim
    #[error(transparent)]
    Provider(Box<dyn std::error::Error + Send + Sync + 'static>),
}

pub type Result<T> = std::result::Result<T, CloudError>;
