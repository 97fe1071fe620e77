//! Handlers y DTOs de la API.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use forge_core::llm::LlmClient;
use forge_core::provision::{BackendDeployer, SchemaProvisioner};
use forge_core::store::ControlStore;
use forge_domain::{App, AppStatus, BlueprintSnapshot, GenerationJob, JobStatus, ValidationStatus};

use crate::api::ApiState;
use crate::errors::ApiError;
use crate::tasks;

/// Identidad del caller, resuelta del header `X-User-Id`. La emisión del
/// token que lo respalda es un colaborador externo.
pub struct OwnerId(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("missing X-User-Id header".to_string()))?;
        Uuid::parse_str(raw)
            .map(OwnerId)
            .map_err(|_| ApiError::BadRequest("invalid X-User-Id header".to_string()))
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateAppRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateAppResponse {
    pub job_id: Uuid,
    pub app_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: AppStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<App> for AppResponse {
    fn from(app: App) -> Self {
        AppResponse {
            id: app.id,
            name: app.name,
            slug: app.slug,
            status: app.status,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppListResponse {
    pub apps: Vec<AppResponse>,
    pub total: usize,
}

/// Detalle de job, incluidos los payloads crudos del LLM para auditoría.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub app_id: Uuid,
    pub status: JobStatus,
    pub model: String,
    pub prompt: String,
    pub llm_request: Option<Value>,
    pub llm_response: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GenerationJob> for JobResponse {
    fn from(job: GenerationJob) -> Self {
        JobResponse {
            id: job.id,
            app_id: job.app_id,
            status: job.status,
            model: job.model,
            prompt: job.prompt,
            llm_request: job.llm_request,
            llm_response: job.llm_response,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlueprintResponse {
    pub id: Uuid,
    pub app_id: Uuid,
    pub version: i32,
    pub blueprint_json: Value,
    pub blueprint_hash: String,
    pub validation_status: ValidationStatus,
    pub validation_errors: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<BlueprintSnapshot> for BlueprintResponse {
    fn from(snapshot: BlueprintSnapshot) -> Self {
        BlueprintResponse {
            id: snapshot.id,
            app_id: snapshot.app_id,
            version: snapshot.version,
            blueprint_json: snapshot.blueprint_json,
            blueprint_hash: snapshot.blueprint_hash,
            validation_status: snapshot.validation_status,
            validation_errors: snapshot.validation_errors,
            created_at: snapshot.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", service: "appforge" })
}

/// Encola una generación: crea App+Job, dispara la tarea desprendida y
/// responde 202 con los ids; el caller sondea el estado del job.
pub async fn generate_app<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Json(request): Json<GenerateAppRequest>,
) -> Result<(StatusCode, Json<GenerateAppResponse>), ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }

    let (app, job) = state
        .pipeline
        .create_records(owner.0, prompt, request.model.as_deref())
        .await?;
    let response = GenerateAppResponse { job_id: job.id, app_id: app.id };

    tasks::spawn_generation(Arc::clone(&state.pipeline), app, job);

    Ok((StatusCode::ACCEPTED, Json(response)))
}

pub async fn list_apps<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
) -> Result<Json<AppListResponse>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    let apps = state.pipeline.store().list_apps(owner.0).await?;
    let apps: Vec<AppResponse> = apps.into_iter().map(AppResponse::from).collect();
    let total = apps.len();
    Ok(Json(AppListResponse { apps, total }))
}

pub async fn get_app<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(app_id): Path<Uuid>,
) -> Result<Json<AppResponse>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    let app = state
        .pipeline
        .store()
        .get_app(app_id, owner.0)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(app.into()))
}

pub async fn start_app<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(app_id): Path<Uuid>,
) -> Result<Json<StatusMessage>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    if state.pipeline.start_app(app_id, owner.0).await? {
        Ok(Json(StatusMessage { status: "started" }))
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn stop_app<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(app_id): Path<Uuid>,
) -> Result<Json<StatusMessage>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    if state.pipeline.stop_app(app_id, owner.0).await? {
        Ok(Json(StatusMessage { status: "stopped" }))
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn delete_app<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(app_id): Path<Uuid>,
) -> Result<Json<StatusMessage>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    if state.pipeline.delete_app(app_id, owner.0).await? {
        Ok(Json(StatusMessage { status: "deleted" }))
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn latest_blueprint<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(app_id): Path<Uuid>,
) -> Result<Json<BlueprintResponse>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    // Primero la propiedad de la App; después el snapshot.
    state
        .pipeline
        .store()
        .get_app(app_id, owner.0)
        .await?
        .ok_or(ApiError::NotFound)?;
    let snapshot = state
        .pipeline
        .store()
        .latest_snapshot(app_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(snapshot.into()))
}

pub async fn get_job<S, L, P, D>(
    State(state): State<ApiState<S, L, P, D>>,
    owner: OwnerId,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError>
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    let job = state
        .pipeline
        .store()
        .get_job(job_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    // Un job ajeno responde igual que uno inexistente.
    state
        .pipeline
        .store()
        .get_app(job.app_id, owner.0)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(job.into()))
}
