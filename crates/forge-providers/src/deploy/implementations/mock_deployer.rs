//! Deployer de prueba: registra llamadas sin tocar disco ni puertos.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use forge_core::provision::{BackendDeployer, DeployError, DeployedBackend};
use forge_domain::Blueprint;

#[derive(Clone, Default)]
pub struct MockDeployer {
    pub deployed: Arc<Mutex<Vec<Uuid>>>,
    pub removed: Arc<Mutex<Vec<Uuid>>>,
    pub fail_deploy: bool,
}

#[async_trait]
impl BackendDeployer for MockDeployer {
    async fn deploy(
        &self,
        app_id: Uuid,
        _blueprint: &Blueprint,
        _db_schema: &str,
    ) -> Result<DeployedBackend, DeployError> {
        if self.fail_deploy {
            return Err(DeployError::Failed("mock deploy failure".to_string()));
        }
        self.deployed.lock().unwrap().push(app_id);
        Ok(DeployedBackend { base_url: "http://localhost:4001/api".to_string(), port: 4001 })
    }

    async fn remove(&self, app_id: Uuid) -> Result<(), DeployError> {
        self.removed.lock().unwrap().push(app_id);
        Ok(())
    }
}
