//! Deployer local: materializa la metadata del backend generado bajo un
//! directorio de trabajo y asigna su puerto contra estado vivo.

use async_trait::async_trait;
use log::{info, warn};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use forge_core::provision::{BackendDeployer, DeployError, DeployedBackend};
use forge_domain::Blueprint;

use super::port_allocator::PortAllocator;

pub struct LocalBackendDeployer {
    apps_path: PathBuf,
    allocator: PortAllocator,
}

impl LocalBackendDeployer {
    pub fn new(apps_path: impl Into<PathBuf>) -> Self {
        LocalBackendDeployer {
            apps_path: apps_path.into(),
            allocator: PortAllocator::default(),
        }
    }

    fn app_dir(&self, app_id: Uuid) -> PathBuf {
        self.apps_path.join(app_id.to_string())
    }

    /// Escaneo vivo: puertos registrados en la metadata de todas las apps ya
    /// generadas en disco. Es la fuente de verdad externa del asignador.
    async fn scan_live_ports(&self) -> HashSet<u16> {
        let mut live = HashSet::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.apps_path).await else {
            return live;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(port) = read_port(&entry.path().join("metadata.json")).await {
                live.insert(port);
            }
        }
        live
    }
}

async fn read_port(metadata_path: &Path) -> Option<u16> {
    let raw = tokio::fs::read_to_string(metadata_path).await.ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;
    u16::try_from(value["port"].as_u64()?).ok()
}

#[async_trait]
impl BackendDeployer for LocalBackendDeployer {
    async fn deploy(
        &self,
        app_id: Uuid,
        blueprint: &Blueprint,
        db_schema: &str,
    ) -> Result<DeployedBackend, DeployError> {
        let app_dir = self.app_dir(app_id);
        tokio::fs::create_dir_all(&app_dir)
            .await
            .map_err(|e| DeployError::Failed(format!("create {app_dir:?}: {e}")))?;

        let live = self.scan_live_ports().await;
        let port = self.allocator.allocate(app_id, &live)?;

        let entities: Vec<&str> = blueprint.tables().iter().map(|t| t.name.as_str()).collect();
        let metadata = json!({
            "app_id": app_id.to_string(),
            "app_name": blueprint.app_name(),
            "app_slug": blueprint.app_slug(),
            "port": port,
            "db_schema": db_schema,
            "status": "generated",
            "entities": entities,
        });

        let serialized = serde_json::to_string_pretty(&metadata)
            .map_err(|e| DeployError::Failed(e.to_string()))?;
        tokio::fs::write(app_dir.join("metadata.json"), serialized)
            .await
            .map_err(|e| {
                // El puerto recién reclamado vuelve al pool si no pudimos
                // persistir la metadata.
                self.allocator.release(app_id);
                DeployError::Failed(format!("write metadata: {e}"))
            })?;

        info!("generated backend for app {app_id} on port {port}");
        Ok(DeployedBackend { base_url: format!("http://localhost:{port}/api"), port })
    }

    async fn remove(&self, app_id: Uuid) -> Result<(), DeployError> {
        let app_dir = self.app_dir(app_id);
        if let Err(e) = tokio::fs::remove_dir_all(&app_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove backend dir {app_dir:?}: {e}");
                return Err(DeployError::Failed(e.to_string()));
            }
        }
        self.allocator.release(app_id);
        Ok(())
    }
}
