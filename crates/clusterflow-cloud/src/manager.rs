//! Manager handle shared by actuators
//!
//! The orchestration layer builds one [`Manager`] per process and hands it to
//! every actuator it constructs. It owns the [`ClusterClient`] actuators use to
//! persist cluster annotations.

use crate::cluster::{ClusterClient, InMemoryClusterClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options for [`Manager::new`]
#[derive(Default)]
pub struct ManagerOptions {
    /// Store for cluster objects; defaults to an in-memory store
    pub cluster_client: Option<Arc<dyn ClusterClient>>,
}

/// Process-wide handle to the orchestration layer
pub struct Manager {
    cluster_client: Arc<dyn ClusterClient>,
    stopped: AtomicBool,
}

impl Manager {
    pub fn new(options: ManagerOptions) -> Self {
        let cluster_client = options
            .cluster_client
            .unwrap_or_else(|| Arc::new(InMemoryClusterClient::new()));

        Self {
            cluster_client,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn cluster_client(&self) -> Arc<dyn ClusterClient> {
        Arc::clone(&self.cluster_client)
    }

    /// Mark the manager as shut down
    ///
    /// Actuators already built keep working; new ones can no longer be
    /// constructed from this handle.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            tracing::info!("Manager stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerOptions::default())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
