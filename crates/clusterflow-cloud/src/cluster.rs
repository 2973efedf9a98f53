//! Cluster object and its status store
//!
//! A [`Cluster`] is owned by the orchestration layer. Actuators read it to
//! derive provider resource names and record per-resource annotations, which
//! are written back through a [`ClusterClient`].

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// A logical cluster as seen by an actuator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name, the root of every derived resource name
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// Provider-specific configuration (e.g. `{"project": "my-gcp-project"}`)
    #[serde(default)]
    pub provider_spec: serde_json::Value,

    /// Version used for optimistic concurrency in [`ClusterClient::update`]
    #[serde(default)]
    pub resource_version: u64,
}

impl Cluster {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            annotations: BTreeMap::new(),
            provider_spec: serde_json::Value::Null,
            resource_version: 0,
        }
    }

    pub fn with_provider_spec(mut self, spec: serde_json::Value) -> Self {
        self.provider_spec = spec;
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// `namespace/name`, or just `name` for cluster-scoped objects
    pub fn key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Set an annotation, returning whether the stored value changed
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.annotations.insert(key.into(), value.clone()) {
            Some(previous) => previous != value,
            None => true,
        }
    }

    /// Decode the provider spec into a provider-specific type
    pub fn provider_spec<T: DeserializeOwned>(&self) -> Result<T> {
        if self.provider_spec.is_null() {
            return Err(CloudError::InvalidProviderSpec {
                cluster: self.key(),
                reason: "provider spec is empty".to_string(),
            });
        }
        serde_json::from_value(self.provider_spec.clone()).map_err(|e| {
            CloudError::InvalidProviderSpec {
                cluster: self.key(),
                reason: e.to_string(),
            }
        })
    }
}

/// Persistence for cluster objects
///
/// Actuators use this to write back annotations recorded while reconciling.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch the stored copy of a cluster
    async fn get(&self, namespace: &str, name: &str) -> Result<Cluster>;

    /// Store a new cluster; fails if one with the same key exists
    async fn create(&self, cluster: &Cluster) -> Result<Cluster>;

    /// Replace a stored cluster
    ///
    /// The caller's `resource_version` must match the stored one. The returned
    /// copy carries the new version.
    async fn update(&self, cluster: &Cluster) -> Result<Cluster>;
}

/// In-process [`ClusterClient`] backed by a map
#[derive(Debug, Default)]
pub struct InMemoryClusterClient {
    clusters: RwLock<HashMap<String, Cluster>>,
}

impl InMemoryClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clusters.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CloudError {
    CloudError::StateError("cluster store lock poisoned".to_string())
}

#[async_trait]
impl ClusterClient for InMemoryClusterClient {
    async fn get(&self, namespace: &str, name: &str) -> Result<Cluster> {
        let key = Cluster::new(name, namespace).key();
        let clusters = self.clusters.read().map_err(poisoned)?;
        clusters
            .get(&key)
            .cloned()
            .ok_or(CloudError::ClusterNotFound(key))
    }

    async fn create(&self, cluster: &Cluster) -> Result<Cluster> {
        let key = cluster.key();
        let mut clusters = self.clusters.write().map_err(poisoned)?;
        if clusters.contains_key(&key) {
            return Err(CloudError::ResourceAlreadyExists(key));
        }

        let mut stored = cluster.clone();
        stored.resource_version = 1;
        clusters.insert(key.clone(), stored.clone());

        tracing::debug!(cluster = %key, "Stored cluster");
        Ok(stored)
    }

    async fn update(&self, cluster: &Cluster) -> Result<Cluster> {
        let key = cluster.key();
        let mut clusters = self.clusters.write().map_err(poisoned)?;
        let current = clusters
            .get_mut(&key)
            .ok_or_else(|| CloudError::ClusterNotFound(key.clone()))?;

        if current.resource_version != cluster.resource_version {
            return Err(CloudError::Conflict {
                key,
                expected: cluster.resource_version,
                found: current.resource_version,
            });
        }

        let mut stored = cluster.clone();
        stored.resource_version = current.resource_version + 1;
        *current = stored.clone();

        tracing::debug!(cluster = %key, version = stored.resource_version, "Updated cluster");
        Ok(stored)
    }
}
