//! GCE provider error types
//!
//! Errors are layered the way callers read them: a [`ComputeError`] is what
//! the Compute API (or the transport) returned, a [`FirewallOpError`] names the
//! mechanical operation that failed, and an [`ActuatorError`] names the
//! cluster resource it was for.

use crate::firewall::FirewallRule;
use clusterflow_cloud::CloudError;
use clusterflow_config::ConfigError;
use thiserror::Error;

const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;

/// Structured error returned by a Google API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleApiError {
    /// HTTP status code reported by the API
    pub code: u16,

    pub message: String,

    /// Raw response body, kept when no message could be decoded
    pub body: String,
}

impl GoogleApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            body: String::new(),
        }
    }
}

impl std::fmt::Display for GoogleApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(
                f,
                "googleapi: got HTTP response code {} with body: {}",
                self.code, self.body
            )
        } else {
            write!(f, "googleapi: Error {}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for GoogleApiError {}

/// Errors from a [`ComputeService`](crate::compute::ComputeService) call
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error(transparent)]
    Api(#[from] GoogleApiError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

impl ComputeError {
    /// Status code reported by the provider, if any
    pub fn code(&self) -> Option<u16> {
        match self {
            ComputeError::Api(e) => Some(e.code),
            _ => None,
        }
    }

    /// The targeted resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(NOT_FOUND)
    }

    /// The resource being created already exists
    pub fn is_already_exists(&self) -> bool {
        self.code() == Some(CONFLICT)
    }
}

/// Mechanical firewall operation, used in error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallOp {
    Create,
    Delete,
    Get,
}

impl std::fmt::Display for FirewallOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FirewallOp::Create => write!(f, "creating"),
            FirewallOp::Delete => write!(f, "deleting"),
            FirewallOp::Get => write!(f, "getting"),
        }
    }
}

/// A firewall operation the provider rejected
#[derive(Error, Debug)]
#[error("error {op} firewall rule: {source}")]
pub struct FirewallOpError {
    pub op: FirewallOp,
    pub source: ComputeError,
}

impl FirewallOpError {
    pub fn new(op: FirewallOp, source: ComputeError) -> Self {
        Self { op, source }
    }
}

/// Errors returned by [`ClusterActuator`](crate::actuator::ClusterActuator)
#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("compute service is required to build a cluster actuator")]
    MissingComputeService,

    #[error("manager has been stopped; cannot build a cluster actuator")]
    ManagerStopped,

    #[error("error loading actuator config: {0}")]
    Config(#[source] ConfigError),

    #[error("error creating compute service: {0}")]
    ComputeService(#[source] ComputeError),

    #[error("error parsing cluster provider spec: {0}")]
    ProviderSpec(#[source] CloudError),

    #[error("error {} firewall rule for {}: {source}", .source.op, .rule.purpose())]
    Firewall {
        rule: FirewallRule,
        source: FirewallOpError,
    },

    #[error("error updating cluster {cluster}: {source}")]
    UpdateCluster {
        cluster: String,
        #[source]
        source: CloudError,
    },
}

impl ActuatorError {
    pub(crate) fn firewall(rule: FirewallRule, source: FirewallOpError) -> Self {
        ActuatorError::Firewall { rule, source }
    }

    /// Provider error behind a failed firewall operation, if that is what failed
    pub fn compute_error(&self) -> Option<&ComputeError> {
        match self {
            ActuatorError::Firewall { source, .. } => Some(&source.source),
            ActuatorError::ComputeService(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ActuatorError> for CloudError {
    fn from(err: ActuatorError) -> Self {
        match err {
            ActuatorError::MissingComputeService
            | ActuatorError::ManagerStopped
            | ActuatorError::Config(_)
            | ActuatorError::ComputeService(_) => CloudError::InvalidConfig(err.to_string()),
            other => CloudError::Provider(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ComputeError>;
