//! Implementación en memoria de `ControlStore` (tests y prototipos).
//! Mantiene paridad 1:1 de contratos con el backend Postgres: mismas reglas
//! de transición, mismo conflating de not-found/not-owned.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use chrono::Utc;
use forge_domain::{
    App, AppRuntimeConfig, AppStatus, BlueprintSnapshot, GenerationJob, JobStatus,
};

use super::types::{ControlStore, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    apps: HashMap<Uuid, App>,
    jobs: HashMap<Uuid, GenerationJob>,
    snapshots: HashMap<Uuid, Vec<BlueprintSnapshot>>,
    runtime: HashMap<Uuid, AppRuntimeConfig>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlStore for MemoryStore {
    async fn insert_app(&self, app: &App) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if guard.apps.values().any(|a| a.slug == app.slug) {
            return Err(StoreError::Backend(format!(
                "duplicate slug '{}'",
                app.slug
            )));
        }
        guard.apps.insert(app.id, app.clone());
        Ok(())
    }

    async fn get_app(&self, app_id: Uuid, owner: Uuid) -> Result<Option<App>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .apps
            .get(&app_id)
            .filter(|a| a.owner_user_id == owner)
            .cloned())
    }

    async fn get_app_by_slug(&self, slug: &str) -> Result<Option<App>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.apps.values().find(|a| a.slug == slug).cloned())
    }

    async fn list_apps(&self, owner: Uuid) -> Result<Vec<App>, StoreError> {
        let guard = self.inner.read().await;
        let mut apps: Vec<App> = guard
            .apps
            .values()
            .filter(|a| a.owner_user_id == owner)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apps)
    }

    async fn slug_exists(
        &self,
        slug: &str,
        exclude_app_id: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .apps
            .values()
            .any(|a| a.slug == slug && Some(a.id) != exclude_app_id))
    }

    async fn rename_app(&self, app_id: Uuid, name: &str, slug: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let app = guard.apps.get_mut(&app_id).ok_or(StoreError::NotFound)?;
        app.name = name.to_string();
        app.slug = slug.to_string();
        app.updated_at = Utc::now();
        Ok(())
    }

    async fn update_app_status(&self, app_id: Uuid, to: AppStatus) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let app = guard.apps.get_mut(&app_id).ok_or(StoreError::NotFound)?;
        app.status = app.status.transition(to)?;
        app.updated_at = Utc::now();
        Ok(())
    }

    async fn set_app_status_owned(
        &self,
        app_id: Uuid,
        owner: Uuid,
        to: AppStatus,
    ) -> Result<bool, StoreError> {
        let mut guard = self.inner.write().await;
        match guard.apps.get_mut(&app_id) {
            Some(app) if app.owner_user_id == owner => {
                app.status = app.status.transition(to)?;
                app.updated_at = Utc::now();
                Ok(true)
            }
            // no encontrado o ajeno: indistinguibles hacia afuera
            _ => Ok(false),
        }
    }

    async fn delete_app_cascade(&self, app_id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.snapshots.remove(&app_id);
        guard.jobs.retain(|_, j| j.app_id != app_id);
        guard.runtime.remove(&app_id);
        guard.apps.remove(&app_id).ok_or(StoreError::NotFound)?;
        Ok(())
    }

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<GenerationJob>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.jobs.get(&job_id).cloned())
    }

    async fn attach_job_payloads(
        &self,
        job_id: Uuid,
        request: &Value,
        response: &Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let job = guard.jobs.get_mut(&job_id).ok_or(StoreError::NotFound)?;
        job.llm_request = Some(request.clone());
        job.llm_response = Some(response.clone());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_job_succeeded(&self, job_id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let job = guard.jobs.get_mut(&job_id).ok_or(StoreError::NotFound)?;
        job.status = job.status.transition(JobStatus::Succeeded)?;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_job_failed(&self, job_id: Uuid, error_message: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let job = guard.jobs.get_mut(&job_id).ok_or(StoreError::NotFound)?;
        job.status = job.status.transition(JobStatus::Failed)?;
        job.error_message = Some(error_message.to_string());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_snapshot(&self, snapshot: &BlueprintSnapshot) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard
            .snapshots
            .entry(snapshot.app_id)
            .or_default()
            .push(snapshot.clone());
        Ok(())
    }

    async fn latest_snapshot(
        &self,
        app_id: Uuid,
    ) -> Result<Option<BlueprintSnapshot>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .snapshots
            .get(&app_id)
            .and_then(|list| list.iter().max_by_key(|s| s.version))
            .cloned())
    }

    async fn next_snapshot_version(&self, app_id: Uuid) -> Result<i32, StoreError> {
        let guard = self.inner.read().await;
        let max = guard
            .snapshots
            .get(&app_id)
            .and_then(|list| list.iter().map(|s| s.version).max())
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert_runtime_config(&self, config: &AppRuntimeConfig) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.runtime.insert(config.app_id, config.clone());
        Ok(())
    }

    async fn get_runtime_config(
        &self,
        app_id: Uuid,
    ) -> Result<Option<AppRuntimeConfig>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.runtime.get(&app_id).cloned())
    }

    async fn set_runtime_enabled(&self, app_id: Uuid, enabled: bool) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if let Some(cfg) = guard.runtime.get_mut(&app_id) {
            cfg.enabled = enabled;
        }
        Ok(())
    }
}
