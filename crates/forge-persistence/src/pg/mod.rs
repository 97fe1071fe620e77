//! Implementación Postgres (sqlx) de `ControlStore`.
//!
//! Objetivo general del módulo:
//! - Paridad 1:1 de contratos con el `MemoryStore` del core: mismas reglas
//!   de transición, mismo conflating not-found/not-owned.
//! - Cada escritura multi-fila va dentro de una transacción sqlx; cada paso
//!   dependiente del pipeline lee estado ya committeado.
//! - Se usa `sqlx::query` con binds + `try_get` en lugar de macros de
//!   introspección, para no atar la compilación a una base viva.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use forge_core::store::{ControlStore, StoreError};
use forge_domain::{
    App, AppRuntimeConfig, AppStatus, BlueprintSnapshot, GenerationJob, JobStatus,
    ValidationStatus,
};

use crate::bootstrap::run_bootstrap;
use crate::error::PersistenceError;

/// Construye un pool sqlx a partir de URL y corre el bootstrap del plano de
/// control una sola vez.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min > max`, usa `min = max`).
/// - Devuelve `PersistenceError::TransientIo` ante errores de conexión.
pub async fn build_pool(
    database_url: &str,
    min_size: u32,
    max_size: u32,
) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        log::warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let pool = PgPoolOptions::new()
        .min_connections(validated_min.min(validated_max))
        .max_connections(validated_max)
        .connect(database_url)
        .await
        .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    run_bootstrap(&pool).await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgControlStore {
    pool: PgPool,
}

impl PgControlStore {
    pub fn new(pool: PgPool) -> Self {
        PgControlStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn app_from_row(row: &PgRow) -> Result<App, PersistenceError> {
    let status_raw: String = row.try_get("status")?;
    Ok(App {
        id: row.try_get("id")?,
        owner_user_id: row.try_get("owner_user_id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        status: AppStatus::parse(&status_raw).map_err(|e| PersistenceError::Unknown(e.to_string()))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn job_from_row(row: &PgRow) -> Result<GenerationJob, PersistenceError> {
    let status_raw: String = row.try_get("status")?;
    Ok(GenerationJob {
        id: row.try_get("id")?,
        app_id: row.try_get("app_id")?,
        status: JobStatus::parse(&status_raw).map_err(|e| PersistenceError::Unknown(e.to_string()))?,
        model: row.try_get("model")?,
        prompt: row.try_get("prompt")?,
        llm_request: row.try_get::<Option<Value>, _>("llm_request")?,
        llm_response: row.try_get::<Option<Value>, _>("llm_response")?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn snapshot_from_row(row: &PgRow) -> Result<BlueprintSnapshot, PersistenceError> {
    let status_raw: String = row.try_get("validation_status")?;
    Ok(BlueprintSnapshot {
        id: row.try_get("id")?,
        app_id: row.try_get("app_id")?,
        version: row.try_get("version")?,
        blueprint_json: row.try_get("blueprint_json")?,
        blueprint_hash: row
            .try_get::<Option<String>, _>("blueprint_hash")?
            .unwrap_or_default(),
        validation_status: ValidationStatus::parse(&status_raw)
            .map_err(|e| PersistenceError::Unknown(e.to_string()))?,
        validation_errors: row.try_get::<Option<Value>, _>("validation_errors")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn runtime_from_row(row: &PgRow) -> Result<AppRuntimeConfig, PersistenceError> {
    Ok(AppRuntimeConfig {
        app_id: row.try_get("app_id")?,
        db_schema: row.try_get("db_schema")?,
        public_base_path: row.try_get("public_base_path")?,
        enabled: row.try_get("enabled")?,
    })
}

#[async_trait]
impl ControlStore for PgControlStore {
    async fn insert_app(&self, app: &App) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO control_plane.apps (id, owner_user_id, name, slug, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(app.id)
        .bind(app.owner_user_id)
        .bind(&app.name)
        .bind(&app.slug)
        .bind(app.status.as_str())
        .bind(app.created_at)
        .bind(app.updated_at)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }

    async fn get_app(&self, app_id: Uuid, owner: Uuid) -> Result<Option<App>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_user_id, name, slug, status, created_at, updated_at
             FROM control_plane.apps WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(app_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        row.as_ref()
            .map(app_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn get_app_by_slug(&self, slug: &str) -> Result<Option<App>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_user_id, name, slug, status, created_at, updated_at
             FROM control_plane.apps WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        row.as_ref()
            .map(app_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn list_apps(&self, owner: Uuid) -> Result<Vec<App>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_user_id, name, slug, status, created_at, updated_at
             FROM control_plane.apps WHERE owner_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        rows.iter()
            .map(|r| app_from_row(r).map_err(StoreError::from))
            .collect()
    }

    async fn slug_exists(
        &self,
        slug: &str,
        exclude_app_id: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS (
               SELECT 1 FROM control_plane.apps
               WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
             ) AS taken",
        )
        .bind(slug)
        .bind(exclude_app_id)
        .fetch_one(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        let taken: bool = row.try_get("taken").map_err(PersistenceError::from)?;
        Ok(taken)
    }

    async fn rename_app(&self, app_id: Uuid, name: &str, slug: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE control_plane.apps SET name = $2, slug = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(app_id)
        .bind(name)
        .bind(slug)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_app_status(&self, app_id: Uuid, to: AppStatus) -> Result<(), StoreError> {
        // read-check-write bajo FOR UPDATE: la tabla de transiciones se
        // evalúa contra el estado committeado más reciente.
        let mut tx = self.pool.begin().await.map_err(PersistenceError::from)?;
        let row = sqlx::query("SELECT status FROM control_plane.apps WHERE id = $1 FOR UPDATE")
            .bind(app_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(PersistenceError::from)?
            .ok_or(StoreError::NotFound)?;
        let current_raw: String = row.try_get("status").map_err(PersistenceError::from)?;
        let current =
            AppStatus::parse(&current_raw).map_err(|e| StoreError::Backend(e.to_string()))?;
        let next = current.transition(to)?;

        sqlx::query("UPDATE control_plane.apps SET status = $2, updated_at = now() WHERE id = $1")
            .bind(app_id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        tx.commit().await.map_err(PersistenceError::from)?;
        debug!("app {app_id} status {current_raw} -> {}", next.as_str());
        Ok(())
    }

    async fn set_app_status_owned(
        &self,
        app_id: Uuid,
        owner: Uuid,
        to: AppStatus,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(PersistenceError::from)?;
        let row = sqlx::query(
            "SELECT status FROM control_plane.apps
             WHERE id = $1 AND owner_user_id = $2 FOR UPDATE",
        )
        .bind(app_id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(PersistenceError::from)?;

        // no encontrado o ajeno: indistinguibles hacia afuera
        let Some(row) = row else {
            return Ok(false);
        };
        let current_raw: String = row.try_get("status").map_err(PersistenceError::from)?;
        let current =
            AppStatus::parse(&current_raw).map_err(|e| StoreError::Backend(e.to_string()))?;
        let next = current.transition(to)?;

        sqlx::query("UPDATE control_plane.apps SET status = $2, updated_at = now() WHERE id = $1")
            .bind(app_id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        tx.commit().await.map_err(PersistenceError::from)?;
        Ok(true)
    }

    async fn delete_app_cascade(&self, app_id: Uuid) -> Result<(), StoreError> {
        // Dependientes primero, App al final, todo en un commit.
        let mut tx = self.pool.begin().await.map_err(PersistenceError::from)?;
        sqlx::query("DELETE FROM control_plane.app_blueprints WHERE app_id = $1")
            .bind(app_id)
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        sqlx::query("DELETE FROM control_plane.generation_jobs WHERE app_id = $1")
            .bind(app_id)
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        sqlx::query("DELETE FROM control_plane.app_runtime_config WHERE app_id = $1")
            .bind(app_id)
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        let result = sqlx::query("DELETE FROM control_plane.apps WHERE id = $1")
            .bind(app_id)
            .execute(&mut *tx)
            .await
            .map_err(PersistenceError::from)?;
        tx.commit().await.map_err(PersistenceError::from)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO control_plane.generation_jobs
               (id, app_id, status, model, prompt, llm_request, llm_response, error_message, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(job.id)
        .bind(job.app_id)
        .bind(job.status.as_str())
        .bind(&job.model)
        .bind(&job.prompt)
        .bind(&job.llm_request)
        .bind(&job.llm_response)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<GenerationJob>, StoreError> {
        let row = sqlx::query(
            "SELECT id, app_id, status, model, prompt, llm_request, llm_response,
                    error_message, created_at, updated_at
             FROM control_plane.generation_jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        row.as_ref()
            .map(job_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn attach_job_payloads(
        &self,
        job_id: Uuid,
        request: &Value,
        response: &Value,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE control_plane.generation_jobs
             SET llm_request = $2, llm_response = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(request)
        .bind(response)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_job_succeeded(&self, job_id: Uuid) -> Result<(), StoreError> {
        self.transition_job(job_id, JobStatus::Succeeded, None).await
    }

    async fn mark_job_failed(&self, job_id: Uuid, error_message: &str) -> Result<(), StoreError> {
        self.transition_job(job_id, JobStatus::Failed, Some(error_message))
            .await
    }

    async fn insert_snapshot(&self, snapshot: &BlueprintSnapshot) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO control_plane.app_blueprints
               (id, app_id, version, blueprint_json, blueprint_hash, validation_status, validation_errors, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(snapshot.id)
        .bind(snapshot.app_id)
        .bind(snapshot.version)
        .bind(&snapshot.blueprint_json)
        .bind(&snapshot.blueprint_hash)
        .bind(snapshot.validation_status.as_str())
        .bind(&snapshot.validation_errors)
        .bind(snapshot.created_at)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }

    async fn latest_snapshot(
        &self,
        app_id: Uuid,
    ) -> Result<Option<BlueprintSnapshot>, StoreError> {
        let row = sqlx::query(
            "SELECT id, app_id, version, blueprint_json, blueprint_hash,
                    validation_status, validation_errors, created_at
             FROM control_plane.app_blueprints
             WHERE app_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        row.as_ref()
            .map(snapshot_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn next_snapshot_version(&self, app_id: Uuid) -> Result<i32, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(version), 0) AS current
             FROM control_plane.app_blueprints WHERE app_id = $1",
        )
        .bind(app_id)
        .fetch_one(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        let current: i32 = row.try_get("current").map_err(PersistenceError::from)?;
        Ok(current + 1)
    }

    async fn insert_runtime_config(&self, config: &AppRuntimeConfig) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO control_plane.app_runtime_config (app_id, db_schema, public_base_path, enabled)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(config.app_id)
        .bind(&config.db_schema)
        .bind(&config.public_base_path)
        .bind(config.enabled)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }

    async fn get_runtime_config(
        &self,
        app_id: Uuid,
    ) -> Result<Option<AppRuntimeConfig>, StoreError> {
        let row = sqlx::query(
            "SELECT app_id, db_schema, public_base_path, enabled
             FROM control_plane.app_runtime_config WHERE app_id = $1",
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        row.as_ref()
            .map(runtime_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn set_runtime_enabled(&self, app_id: Uuid, enabled: bool) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE control_plane.app_runtime_config SET enabled = $2 WHERE app_id = $1",
        )
        .bind(app_id)
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }
}

impl PgControlStore {
    /// Transición de Job bajo FOR UPDATE; un estado terminal nunca se
    /// abandona (la tabla de transiciones lo rechaza).
    async fn transition_job(
        &self,
        job_id: Uuid,
        to: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(PersistenceError::from)?;
        let row = sqlx::query(
            "SELECT status FROM control_plane.generation_jobs WHERE id = $1 FOR UPDATE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(PersistenceError::from)?
        .ok_or(StoreError::NotFound)?;
        let current_raw: String = row.try_get("status").map_err(PersistenceError::from)?;
        let current =
            JobStatus::parse(&current_raw).map_err(|e| StoreError::Backend(e.to_string()))?;
        let next = current.transition(to)?;

        sqlx::query(
            "UPDATE control_plane.generation_jobs
             SET status = $2, error_message = COALESCE($3, error_message), updated_at = now()
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(next.as_str())
        .bind(error_message)
        .execute(&mut *tx)
        .await
        .map_err(PersistenceError::from)?;
        tx.commit().await.map_err(PersistenceError::from)?;
        Ok(())
    }
}
