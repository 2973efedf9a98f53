//! Cluster actuator trait definition

use crate::cluster::Cluster;
use crate::error::Result;
use async_trait::async_trait;

/// Lifecycle hooks the orchestration layer calls for each cluster event
///
/// Every provider (GCE today) implements this trait. Implementations are
/// stateless across calls and never retry on their own: a failed call is
/// expected to be repeated by the next reconciliation pass, so each hook must
/// be idempotent.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Returns the provider name (e.g., "gce")
    fn name(&self) -> &str;

    /// Create the provider resources owned by the cluster
    ///
    /// May record annotations on `cluster` and persist them.
    async fn create(&self, cluster: &mut Cluster) -> Result<()>;

    /// Bring existing provider resources in line with the cluster
    async fn update(&self, cluster: &mut Cluster) -> Result<()>;

    /// Tear down the provider resources owned by the cluster
    ///
    /// Resources that are already gone count as deleted.
    async fn delete(&self, cluster: &Cluster) -> Result<()>;

    /// Whether every provider resource owned by the cluster exists
    async fn exists(&self, cluster: &Cluster) -> Result<bool>;
}
