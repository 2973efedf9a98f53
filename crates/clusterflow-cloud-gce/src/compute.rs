//! Compute API capability
//!
//! [`ComputeService`] is the only way the actuator talks to Compute Engine.
//! Production code plugs in [`GceComputeService`](crate::client::GceComputeService);
//! tests plug in deterministic doubles.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutations and lookups against Compute Engine networking resources
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Request deletion of a firewall rule
    ///
    /// The returned operation is accepted, not necessarily finished.
    async fn firewalls_delete(&self, project: &str, name: &str) -> Result<Operation>;

    /// Request creation of a firewall rule
    async fn firewalls_insert(&self, project: &str, firewall: &Firewall) -> Result<Operation>;

    /// Fetch a firewall rule by name
    async fn firewalls_get(&self, project: &str, name: &str) -> Result<Firewall>;
}

/// Handle for an asynchronous Compute operation
///
/// Every field is optional; a default (empty) operation is a valid response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub operation_type: Option<String>,

    /// PENDING, RUNNING or DONE
    pub status: Option<String>,

    pub target_link: Option<String>,
    pub insert_time: Option<DateTime<Utc>>,
}

/// Compute Engine firewall rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firewall {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<FirewallAllowed>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_ranges: Vec<String>,
}

/// Protocol/port pair a firewall rule allows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallAllowed {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}
