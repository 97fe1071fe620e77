//! Integración de la superficie HTTP con colaboradores en memoria: el
//! handler de generación responde de inmediato y la tarea desprendida deja
//! el desenlace consultable vía los handlers de lectura.

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use appforge_rust::api::routes::{self, GenerateAppRequest, OwnerId};
use appforge_rust::api::ApiState;
use appforge_rust::ApiError;
use forge_core::provision::{ProvisionError, SchemaProvisioner};
use forge_core::{BackendMode, GenerationPipeline, MemoryStore};
use forge_domain::{AppStatus, Blueprint, JobStatus};
use forge_providers::deploy::MockDeployer;
use forge_providers::MockLlmClient;

/// Provisioner nulo: suficiente para ejercitar la API sin Postgres.
#[derive(Clone, Default)]
struct NullProvisioner;

#[async_trait]
impl SchemaProvisioner for NullProvisioner {
    async fn provision(&self, _schema: &str, _bp: &Blueprint) -> Result<(), ProvisionError> {
        Ok(())
    }
    async fn drop_schema(&self, _schema: &str) -> Result<(), ProvisionError> {
        Ok(())
    }
}

type TestState = ApiState<MemoryStore, MockLlmClient, NullProvisioner, MockDeployer>;

fn state_with(llm: MockLlmClient) -> (TestState, MemoryStore) {
    let store = MemoryStore::new();
    let pipeline = GenerationPipeline::new(
        store.clone(),
        llm,
        NullProvisioner,
        MockDeployer::default(),
        BackendMode::SqlSchema,
    );
    (ApiState { pipeline: Arc::new(pipeline) }, store)
}

fn valid_doc() -> serde_json::Value {
    json!({
        "version": 3,
        "app": { "name": "Todo", "slug": "todo" },
        "backend": { "generator": "amplication" },
        "data": {
            "tables": [{
                "name": "Task",
                "columns": [
                    { "name": "title", "type": "text", "required": true },
                    { "name": "done", "type": "bool", "default": false }
                ]
            }],
            "relationships": []
        },
        "security": { "roles": [{ "name": "Admin" }], "permissions": [] },
        "ui": { "navigation": [], "pages": [] }
    })
}

/// Sondea el job hasta verlo terminal (la tarea corre desprendida).
async fn wait_for_terminal_job(
    state: &TestState,
    owner: Uuid,
    job_id: Uuid,
) -> routes::JobResponse {
    for _ in 0..100 {
        let Json(job) = routes::get_job(State(state.clone()), OwnerId(owner), Path(job_id))
            .await
            .expect("job visible");
        if matches!(job.status, JobStatus::Succeeded | JobStatus::Failed) {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}

#[tokio::test]
async fn generate_responde_ids_y_el_job_llega_a_succeeded() {
    let (state, store) = state_with(MockLlmClient::with_documents(vec![valid_doc()]));
    let owner = Uuid::new_v4();

    let (status, Json(accepted)) = routes::generate_app(
        State(state.clone()),
        OwnerId(owner),
        Json(GenerateAppRequest { prompt: "a todo app".into(), model: None }),
    )
    .await
    .expect("202");
    assert_eq!(status, axum::http::StatusCode::ACCEPTED);

    let job = wait_for_terminal_job(&state, owner, accepted.job_id).await;
    assert_eq!(job.status, JobStatus::Succeeded);
    assert!(job.llm_request.is_some());

    let Json(app) = routes::get_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .expect("app visible");
    assert_eq!(app.status, AppStatus::Running);
    assert_eq!(app.slug, "todo");

    let Json(bp) =
        routes::latest_blueprint(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
            .await
            .expect("blueprint visible");
    assert_eq!(bp.version, 1);

    // El runtime quedó habilitado en el store.
    let runtime = {
        use forge_core::store::ControlStore;
        store.get_runtime_config(accepted.app_id).await.unwrap().unwrap()
    };
    assert!(runtime.enabled);
}

#[tokio::test]
async fn app_ajena_responde_not_found_en_todas_las_rutas() {
    let (state, _store) = state_with(MockLlmClient::with_documents(vec![valid_doc()]));
    let owner = Uuid::new_v4();
    let intruso = Uuid::new_v4();

    let (_, Json(accepted)) = routes::generate_app(
        State(state.clone()),
        OwnerId(owner),
        Json(GenerateAppRequest { prompt: "a todo app".into(), model: None }),
    )
    .await
    .unwrap();
    wait_for_terminal_job(&state, owner, accepted.job_id).await;

    let err = routes::get_app(State(state.clone()), OwnerId(intruso), Path(accepted.app_id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = routes::get_job(State(state.clone()), OwnerId(intruso), Path(accepted.job_id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = routes::stop_app(State(state.clone()), OwnerId(intruso), Path(accepted.app_id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test]
async fn stop_y_start_alternan_el_estado() {
    let (state, _store) = state_with(MockLlmClient::with_documents(vec![valid_doc()]));
    let owner = Uuid::new_v4();

    let (_, Json(accepted)) = routes::generate_app(
        State(state.clone()),
        OwnerId(owner),
        Json(GenerateAppRequest { prompt: "a todo app".into(), model: None }),
    )
    .await
    .unwrap();
    wait_for_terminal_job(&state, owner, accepted.job_id).await;

    routes::stop_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .expect("stop");
    let Json(app) = routes::get_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .unwrap();
    assert_eq!(app.status, AppStatus::Stopped);

    routes::start_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .expect("start");
    let Json(app) = routes::get_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .unwrap();
    assert_eq!(app.status, AppStatus::Running);
}

#[tokio::test]
async fn delete_deja_todo_inconsultable() {
    let (state, _store) = state_with(MockLlmClient::with_documents(vec![valid_doc()]));
    let owner = Uuid::new_v4();

    let (_, Json(accepted)) = routes::generate_app(
        State(state.clone()),
        OwnerId(owner),
        Json(GenerateAppRequest { prompt: "a todo app".into(), model: None }),
    )
    .await
    .unwrap();
    wait_for_terminal_job(&state, owner, accepted.job_id).await;

    routes::delete_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
        .await
        .expect("delete");

    for err in [
        routes::get_app(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
            .await
            .unwrap_err(),
        routes::get_job(State(state.clone()), OwnerId(owner), Path(accepted.job_id))
            .await
            .unwrap_err(),
        routes::latest_blueprint(State(state.clone()), OwnerId(owner), Path(accepted.app_id))
            .await
            .unwrap_err(),
    ] {
        assert!(matches!(err, ApiError::NotFound));
    }
}

#[tokio::test]
async fn prompt_vacio_es_bad_request() {
    let (state, _store) = state_with(MockLlmClient::default());
    let err = routes::generate_app(
        State(state),
        OwnerId(Uuid::new_v4()),
        Json(GenerateAppRequest { prompt: "   ".into(), model: None }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn fallo_de_llm_en_background_deja_job_failed_y_app_error() {
    // Guion vacío: la primera llamada del LLM falla como transporte.
    let (state, store) = state_with(MockLlmClient::default());
    let owner = Uuid::new_v4();

    let (_, Json(accepted)) = routes::generate_app(
        State(state.clone()),
        OwnerId(owner),
        Json(GenerateAppRequest { prompt: "a doomed app".into(), model: None }),
    )
    .await
    .unwrap();

    let job = wait_for_terminal_job(&state, owner, accepted.job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("mock script exhausted"));

    use forge_core::store::ControlStore;
    let app = store.get_app(accepted.app_id, owner).await.unwrap().unwrap();
    assert_eq!(app.status, AppStatus::Error);
}
