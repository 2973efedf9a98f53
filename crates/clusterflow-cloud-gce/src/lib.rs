//! Google Compute Engine actuator for clusterflow
//!
//! This crate implements the [`Actuator`](clusterflow_cloud::Actuator) trait
//! for GCE. Each cluster owns two firewall rules: one for internal cluster
//! traffic and one opening the API server port.
//!
//! # Features
//!
//! - Idempotent firewall rule creation (annotations + "already exists");
//!   recorded rules missing on the provider are recreated
//! - Idempotent teardown ("not found" counts as deleted)
//! - Pluggable [`ComputeService`]; [`GceComputeService`] talks to the REST API
//!
//! # Requirements
//!
//! - An OAuth access token, from `GCE_ACCESS_TOKEN` or the config file
//! - The cluster's provider spec must carry `project`
//!
//! # Example
//!
//! ```ignore
//! use clusterflow_cloud::{Cluster, Manager};
//! use clusterflow_cloud_gce::{ClusterActuator, ComputeConfig};
//!
//! let manager = Manager::default();
//! let actuator = ClusterActuator::from_config(&manager, ComputeConfig::from_env()?)?;
//! // or, from clusterflow.yaml:
//! let actuator = ClusterActuator::from_config_file(&manager)?;
//!
//! let cluster = Cluster::new("prod", "default")
//!     .with_provider_spec(serde_json::json!({ "project": "my-project" }));
//!
//! // Safe to call again after a partial failure
//! actuator.delete(&cluster).await?;
//! ```

pub mod actuator;
pub mod client;
pub mod compute;
pub mod error;
pub mod firewall;

pub use actuator::{ClusterActuator, ClusterActuatorParams, ClusterProviderSpec};
pub use client::{ComputeConfig, GceComputeService};
pub use compute::{ComputeService, Firewall, FirewallAllowed, Operation};
pub use error::{
    ActuatorError, ComputeError, FirewallOp, FirewallOpError, GoogleApiError, Result,
};
pub use firewall::FirewallRule;
