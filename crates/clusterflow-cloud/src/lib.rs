//! clusterflow cloud abstractions
//!
//! This crate holds the provider-independent half of a cluster actuator:
//! the [`Cluster`] object, the [`ClusterClient`] used to persist it, the
//! process-wide [`Manager`] and the [`Actuator`] lifecycle trait that each
//! provider crate implements.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            orchestration framework              │
//! │     (watches clusters, retries, backoff)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │ create / update / delete / exists
//! ┌─────────────────▼───────────────────────────────┐
//! │               clusterflow-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait Actuator { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │   Cluster    │  │ Manager / Client     │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │      gce      │
//!           │   actuator    │
//!           └───────────────┘
//! ```

pub mod actuator;
pub mod cluster;
pub mod error;
pub mod manager;

// Re-exports
pub use actuator::Actuator;
pub use cluster::{Cluster, ClusterClient, InMemoryClusterClient};
pub use error::{CloudError, Result};
pub use manager::{Manager, ManagerOptions};
