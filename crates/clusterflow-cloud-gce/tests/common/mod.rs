#![allow(dead_code)]

use async_trait::async_trait;
use clusterflow_cloud::{Cluster, Manager};
use clusterflow_cloud_gce::{
    ClusterActuator, ClusterActuatorParams, ComputeError, ComputeService, Firewall,
    GoogleApiError, Operation,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type DeleteFn = Box<dyn Fn(&str, &str) -> Result<Operation, ComputeError> + Send + Sync>;
type InsertFn = Box<dyn Fn(&str, &Firewall) -> Result<Operation, ComputeError> + Send + Sync>;
type GetFn = Box<dyn Fn(&str, &str) -> Result<Firewall, ComputeError> + Send + Sync>;

/// ComputeService whose every call is answered by a closure
#[derive(Default)]
pub struct ComputeServiceMock {
    pub mock_firewalls_delete: Option<DeleteFn>,
    pub mock_firewalls_insert: Option<InsertFn>,
    pub mock_firewalls_get: Option<GetFn>,
}

#[async_trait]
impl ComputeService for ComputeServiceMock {
    async fn firewalls_delete(&self, project: &str, name: &str) -> Result<Operation, ComputeError> {
        let f = self
            .mock_firewalls_delete
            .as_ref()
            .expect("unexpected call to firewalls_delete");
        f(project, name)
    }

    async fn firewalls_insert(
        &self,
        project: &str,
        firewall: &Firewall,
    ) -> Result<Operation, ComputeError> {
        let f = self
            .mock_firewalls_insert
            .as_ref()
            .expect("unexpected call to firewalls_insert");
        f(project, firewall)
    }

    async fn firewalls_get(&self, project: &str, name: &str) -> Result<Firewall, ComputeError> {
        let f = self
            .mock_firewalls_get
            .as_ref()
            .expect("unexpected call to firewalls_get");
        f(project, name)
    }
}

/// ComputeService keeping firewall rules in memory, like a tiny Compute API
#[derive(Default)]
pub struct FakeCompute {
    firewalls: Mutex<HashMap<String, Firewall>>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<GoogleApiError>>,
}

impl FakeCompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with the given error
    pub fn fail_next(&self, err: GoogleApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn contains(&self, project: &str, name: &str) -> bool {
        self.firewalls
            .lock()
            .unwrap()
            .contains_key(&format!("{}/{}", project, name))
    }

    /// Drop a rule behind the actuator's back
    pub fn remove(&self, project: &str, name: &str) -> bool {
        self.firewalls
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", project, name))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.firewalls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ComputeError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

fn not_found(project: &str, name: &str) -> ComputeError {
    GoogleApiError::new(
        404,
        format!(
            "The resource 'projects/{}/global/firewalls/{}' was not found",
            project, name
        ),
    )
    .into()
}

#[async_trait]
impl ComputeService for FakeCompute {
    async fn firewalls_delete(&self, project: &str, name: &str) -> Result<Operation, ComputeError> {
        self.record(format!("delete {}", name))?;
        match self
            .firewalls
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", project, name))
        {
            Some(_) => Ok(Operation {
                operation_type: Some("delete".to_string()),
                status: Some("PENDING".to_string()),
                ..Default::default()
            }),
            None => Err(not_found(project, name)),
        }
    }

    async fn firewalls_insert(
        &self,
        project: &str,
        firewall: &Firewall,
    ) -> Result<Operation, ComputeError> {
        self.record(format!("insert {}", firewall.name))?;
        let key = format!("{}/{}", project, firewall.name);
        let mut firewalls = self.firewalls.lock().unwrap();
        if firewalls.contains_key(&key) {
            return Err(GoogleApiError::new(
                409,
                format!("The resource '{}' already exists", key),
            )
            .into());
        }
        firewalls.insert(key, firewall.clone());
        Ok(Operation {
            operation_type: Some("insert".to_string()),
            status: Some("PENDING".to_string()),
            ..Default::default()
        })
    }

    async fn firewalls_get(&self, project: &str, name: &str) -> Result<Firewall, ComputeError> {
        self.record(format!("get {}", name))?;
        self.firewalls
            .lock()
            .unwrap()
            .get(&format!("{}/{}", project, name))
            .cloned()
            .ok_or_else(|| not_found(project, name))
    }
}

pub const PROJECT: &str = "test-project";

pub fn new_default_cluster_fixture() -> Cluster {
    Cluster::new("test-cluster", "default")
        .with_provider_spec(serde_json::json!({ "project": PROJECT }))
}

pub fn new_cluster_actuator(manager: &Manager, params: ClusterActuatorParams) -> ClusterActuator {
    ClusterActuator::new(manager, params).expect("error creating cluster actuator")
}

pub fn compute(service: impl ComputeService + 'static) -> Option<Arc<dyn ComputeService>> {
    let service: Arc<dyn ComputeService> = Arc::new(service);
    Some(service)
}

pub fn shared(fake: &Arc<FakeCompute>) -> Option<Arc<dyn ComputeService>> {
    let service: Arc<dyn ComputeService> = fake.clone();
    Some(service)
}
