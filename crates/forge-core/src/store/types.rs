use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use forge_domain::{
    App, AppRuntimeConfig, AppStatus, BlueprintSnapshot, DomainError, GenerationJob,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    /// Transiciones ilegales y otras violaciones de dominio detectadas al
    /// escribir.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// CRUD con scoping por fila para App, GenerationJob, snapshots de Blueprint
/// y AppRuntimeConfig.
///
/// Contratos relevantes:
/// - `set_app_status_owned` devuelve `false` si la fila no matchea id+owner
///   (deliberadamente indistinguible de "no existe" para no filtrar
///   existencia a no-propietarios).
/// - `update_app_status` y los `mark_job_*` hacen cumplir las tablas de
///   transición del dominio; un estado terminal de Job nunca se abandona.
/// - `delete_app_cascade` borra dependientes (snapshots, jobs, runtime
///   config) y después la fila de App.
#[async_trait]
pub trait ControlStore: Send + Sync {
    async fn insert_app(&self, app: &App) -> Result<(), StoreError>;
    async fn get_app(&self, app_id: Uuid, owner: Uuid) -> Result<Option<App>, StoreError>;
    async fn get_app_by_slug(&self, slug: &str) -> Result<Option<App>, StoreError>;
    async fn list_apps(&self, owner: Uuid) -> Result<Vec<App>, StoreError>;
    async fn slug_exists(
        &self,
        slug: &str,
        exclude_app_id: Option<Uuid>,
    ) -> Result<bool, StoreError>;
    async fn rename_app(&self, app_id: Uuid, name: &str, slug: &str) -> Result<(), StoreError>;
    async fn update_app_status(&self, app_id: Uuid, to: AppStatus) -> Result<(), StoreError>;
    async fn set_app_status_owned(
        &self,
        app_id: Uuid,
        owner: Uuid,
        to: AppStatus,
    ) -> Result<bool, StoreError>;
    async fn delete_app_cascade(&self, app_id: Uuid) -> Result<(), StoreError>;

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError>;
    async fn get_job(&self, job_id: Uuid) -> Result<Option<GenerationJob>, StoreError>;
    async fn attach_job_payloads(
        &self,
        job_id: Uuid,
        request: &Value,
        response: &Value,
    ) -> Result<(), StoreError>;
    async fn mark_job_succeeded(&self, job_id: Uuid) -> Result<(), StoreError>;
    async fn mark_job_failed(&self, job_id: Uuid, error_message: &str) -> Result<(), StoreError>;

    async fn insert_snapshot(&self, snapshot: &BlueprintSnapshot) -> Result<(), StoreError>;
    async fn latest_snapshot(
        &self,
        app_id: Uuid,
    ) -> Result<Option<BlueprintSnapshot>, StoreError>;
    async fn next_snapshot_version(&self, app_id: Uuid) -> Result<i32, StoreError>;

    async fn insert_runtime_config(&self, config: &AppRuntimeConfig) -> Result<(), StoreError>;
    async fn get_runtime_config(
        &self,
        app_id: Uuid,
    ) -> Result<Option<AppRuntimeConfig>, StoreError>;
    async fn set_runtime_enabled(&self, app_id: Uuid, enabled: bool) -> Result<(), StoreError>;
}
