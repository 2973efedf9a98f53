//! GCE cluster actuator
//!
//! Owns the per-cluster firewall rules. Every hook is safe to repeat: create
//! skips recorded rules the provider still has and accepts "already exists",
//! delete accepts "not found". Nothing here retries; the orchestration layer
//! calls again on its next pass.

use crate::client::{ComputeConfig, GceComputeService};
use crate::compute::ComputeService;
use crate::error::{ActuatorError, FirewallOp, FirewallOpError};
use crate::firewall::FirewallRule;
use async_trait::async_trait;
use clusterflow_cloud::{Actuator, CloudError, Cluster, ClusterClient, Manager};
use clusterflow_config::ActuatorConfig;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

type Result<T> = std::result::Result<T, ActuatorError>;

/// GCE-specific part of a cluster's provider spec
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProviderSpec {
    pub project: String,
}

/// Dependencies injected into [`ClusterActuator::new`]
#[derive(Default, Clone)]
pub struct ClusterActuatorParams {
    /// Required; every Compute call goes through it
    pub compute_service: Option<Arc<dyn ComputeService>>,

    /// Where recorded annotations are persisted; defaults to the manager's client
    pub cluster_client: Option<Arc<dyn ClusterClient>>,
}

/// Cluster actuator for Google Compute Engine
pub struct ClusterActuator {
    compute_service: Arc<dyn ComputeService>,
    cluster_client: Arc<dyn ClusterClient>,
}

impl ClusterActuator {
    pub fn new(manager: &Manager, params: ClusterActuatorParams) -> Result<Self> {
        if manager.is_stopped() {
            return Err(ActuatorError::ManagerStopped);
        }
        let compute_service = params
            .compute_service
            .ok_or(ActuatorError::MissingComputeService)?;
        let cluster_client = params
            .cluster_client
            .unwrap_or_else(|| manager.cluster_client());

        Ok(Self {
            compute_service,
            cluster_client,
        })
    }

    /// Build an actuator talking to the Compute REST API
    pub fn from_config(manager: &Manager, config: ComputeConfig) -> Result<Self> {
        let service = GceComputeService::new(config).map_err(ActuatorError::ComputeService)?;
        Self::new(
            manager,
            ClusterActuatorParams {
                compute_service: Some(Arc::new(service)),
                cluster_client: None,
            },
        )
    }

    /// Build an actuator from the discovered config file
    ///
    /// See [`clusterflow_config::find_config_file`] for the search order. A
    /// token missing from the file is read from `GCE_ACCESS_TOKEN`.
    pub fn from_config_file(manager: &Manager) -> Result<Self> {
        let config = ActuatorConfig::discover().map_err(ActuatorError::Config)?;
        Self::from_actuator_config(manager, &config)
    }

    /// Build an actuator from a specific config file
    pub fn from_config_path(manager: &Manager, path: impl AsRef<Path>) -> Result<Self> {
        let config = ActuatorConfig::load(path).map_err(ActuatorError::Config)?;
        Self::from_actuator_config(manager, &config)
    }

    fn from_actuator_config(manager: &Manager, config: &ActuatorConfig) -> Result<Self> {
        let compute = ComputeConfig::from_settings(&config.compute)
            .map_err(ActuatorError::ComputeService)?;
        tracing::debug!(endpoint = %compute.endpoint, "Building actuator from config file");
        Self::from_config(manager, compute)
    }

    fn project(cluster: &Cluster) -> Result<String> {
        let spec: ClusterProviderSpec = cluster
            .provider_spec()
            .map_err(ActuatorError::ProviderSpec)?;

        if spec.project.trim().is_empty() {
            return Err(ActuatorError::ProviderSpec(CloudError::InvalidProviderSpec {
                cluster: cluster.key(),
                reason: "project is empty".to_string(),
            }));
        }
        Ok(spec.project)
    }

    /// Delete every firewall rule the cluster owns
    ///
    /// Stops at the first rule the provider fails to delete. Rules that are
    /// already gone count as deleted.
    pub async fn delete(&self, cluster: &Cluster) -> Result<()> {
        let project = Self::project(cluster)?;

        for rule in FirewallRule::ALL {
            self.delete_firewall_rule(&project, cluster, rule)
                .await
                .map_err(|e| ActuatorError::firewall(rule, e))?;
        }

        tracing::info!(cluster = %cluster.key(), "Deleted cluster firewall rules");
        Ok(())
    }

    async fn delete_firewall_rule(
        &self,
        project: &str,
        cluster: &Cluster,
        rule: FirewallRule,
    ) -> std::result::Result<(), FirewallOpError> {
        let name = rule.name_for(cluster);
        tracing::info!(cluster = %cluster.key(), project, rule = %name, "Deleting firewall rule");

        match self.compute_service.firewalls_delete(project, &name).await {
            Ok(_operation) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!(rule = %name, "Firewall rule not found, nothing to delete");
                Ok(())
            }
            Err(e) => Err(FirewallOpError::new(FirewallOp::Delete, e)),
        }
    }

    /// Make sure every firewall rule the cluster owns exists
    ///
    /// A rule recorded on the cluster is confirmed with the provider and only
    /// recreated if it has gone missing. Each newly recorded rule is persisted
    /// right away, so a later failure does not lose the record.
    pub async fn reconcile(&self, cluster: &mut Cluster) -> Result<()> {
        tracing::info!(cluster = %cluster.key(), "Reconciling cluster");
        let project = Self::project(cluster)?;

        for rule in FirewallRule::ALL {
            if rule.is_recorded(cluster) && self.rule_exists(&project, cluster, rule).await? {
                tracing::debug!(
                    cluster = %cluster.key(),
                    rule = %rule.name_for(cluster),
                    "Firewall rule already recorded, skipping"
                );
                continue;
            }

            self.create_firewall_rule(&project, cluster, rule)
                .await
                .map_err(|e| ActuatorError::firewall(rule, e))?;

            let key = rule.annotation_key(cluster);
            if !cluster.set_annotation(key, "true") {
                continue;
            }

            let cluster_key = cluster.key();
            let stored = self.cluster_client.update(cluster).await.map_err(|source| {
                ActuatorError::UpdateCluster {
                    cluster: cluster_key,
                    source,
                }
            })?;
            *cluster = stored;
        }

        Ok(())
    }

    async fn rule_exists(
        &self,
        project: &str,
        cluster: &Cluster,
        rule: FirewallRule,
    ) -> Result<bool> {
        let name = rule.name_for(cluster);
        match self.compute_service.firewalls_get(project, &name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                tracing::debug!(cluster = %cluster.key(), rule = %name, "Firewall rule missing");
                Ok(false)
            }
            Err(e) => Err(ActuatorError::firewall(
                rule,
                FirewallOpError::new(FirewallOp::Get, e),
            )),
        }
    }

    async fn create_firewall_rule(
        &self,
        project: &str,
        cluster: &Cluster,
        rule: FirewallRule,
    ) -> std::result::Result<(), FirewallOpError> {
        let firewall = rule.spec_for(cluster);
        tracing::info!(cluster = %cluster.key(), project, rule = %firewall.name, "Creating firewall rule");

        match self.compute_service.firewalls_insert(project, &firewall).await {
            Ok(_operation) => Ok(()),
            Err(e) if e.is_already_exists() => {
                tracing::debug!(rule = %firewall.name, "Firewall rule already exists");
                Ok(())
            }
            Err(e) => Err(FirewallOpError::new(FirewallOp::Create, e)),
        }
    }

    /// Whether every firewall rule the cluster owns exists on the provider
    pub async fn exists(&self, cluster: &Cluster) -> Result<bool> {
        let project = Self::project(cluster)?;

        for rule in FirewallRule::ALL {
            if !self.rule_exists(&project, cluster, rule).await? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl Actuator for ClusterActuator {
    fn name(&self) -> &str {
        "gce"
    }

    async fn create(&self, cluster: &mut Cluster) -> clusterflow_cloud::Result<()> {
        Ok(self.reconcile(cluster).await?)
    }

    async fn update(&self, cluster: &mut Cluster) -> clusterflow_cloud::Result<()> {
        Ok(self.reconcile(cluster).await?)
    }

    async fn delete(&self, cluster: &Cluster) -> clusterflow_cloud::Result<()> {
        Ok(ClusterActuator::delete(self, cluster).await?)
    }

    async fn exists(&self, cluster: &Cluster) -> clusterflow_cloud::Result<bool> {
        Ok(ClusterActuator::exists(self, cluster).await?)
    }
}
