//! Superficie HTTP mínima del plano de control.
//!
//! El routing y la emisión de tokens son colaboradores externos del core: acá
//! sólo se expone lo necesario para ejercitarlo. La identidad del caller
//! llega en el header `X-User-Id`; not-found y not-owned responden igual.

pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use forge_core::llm::LlmClient;
use forge_core::provision::{BackendDeployer, SchemaProvisioner};
use forge_core::store::ControlStore;
use forge_core::GenerationPipeline;

/// Estado compartido de los handlers: el orquestador con sus colaboradores.
pub struct ApiState<S, L, P, D>
where
    S: ControlStore,
    L: LlmClient,
    P: SchemaProvisioner,
    D: BackendDeployer,
{
    pub pipeline: Arc<GenerationPipeline<S, L, P, D>>,
}

impl<S, L, P, D> Clone for ApiState<S, L, P, D>
where
    S: ControlStore,
    L: LlmClient,
    P: SchemaProvisioner,
    D: BackendDeployer,
{
    fn clone(&self) -> Self {
        ApiState { pipeline: Arc::clone(&self.pipeline) }
    }
}

/// Construye el router completo de la API.
pub fn router<S, L, P, D>(state: ApiState<S, L, P, D>) -> Router
where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    Router::new()
        .route("/api/health", get(routes::health_check))
        .route("/api/apps", get(routes::list_apps::<S, L, P, D>))
        .route("/api/apps/generate", post(routes::generate_app::<S, L, P, D>))
        .route(
            "/api/apps/:app_id",
            get(routes::get_app::<S, L, P, D>).delete(routes::delete_app::<S, L, P, D>),
        )
        .route("/api/apps/:app_id/start", post(routes::start_app::<S, L, P, D>))
        .route("/api/apps/:app_id/stop", post(routes::stop_app::<S, L, P, D>))
        .route(
            "/api/apps/:app_id/blueprints/latest",
            get(routes::latest_blueprint::<S, L, P, D>),
        )
        .route("/api/jobs/:job_id", get(routes::get_job::<S, L, P, D>))
        .with_state(state)
}
