//! Escenarios end-to-end del orquestador sobre el store en memoria, con un
//! LLM guionado y colaboradores de aprovisionamiento instrumentados.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use forge_core::llm::{LlmClient, LlmError, LlmExchange};
use forge_core::provision::{
    BackendDeployer, DeployError, DeployedBackend, ProvisionError, SchemaProvisioner,
};
use forge_core::store::ControlStore;
use forge_core::{BackendMode, GenerationPipeline, MemoryStore};
use forge_domain::{AppStatus, Blueprint, JobStatus, ValidationStatus};

// ---------------------------------------------------------------------------
// Colaboradores de prueba
// ---------------------------------------------------------------------------

/// LLM guionado: devuelve respuestas en orden, tanto para generate como para
/// repair.
struct ScriptedLlm {
    script: Mutex<VecDeque<Result<LlmExchange, LlmError>>>,
}

impl ScriptedLlm {
    fn new(script: Vec<Result<LlmExchange, LlmError>>) -> Self {
        ScriptedLlm { script: Mutex::new(script.into()) }
    }

    fn next(&self) -> Result<LlmExchange, LlmError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn default_model(&self) -> &str {
        "test/model"
    }

    async fn generate(&self, _prompt: &str, _model: &str) -> Result<LlmExchange, LlmError> {
        self.next()
    }

    async fn repair(
        &self,
        _original_prompt: &str,
        _invalid_json: &str,
        _validation_errors: &str,
        _model: &str,
    ) -> Result<LlmExchange, LlmError> {
        self.next()
    }
}

fn exchange(document: Value) -> LlmExchange {
    LlmExchange {
        request: json!({ "messages": [], "model": "test/model" }),
        response: json!({ "choices": [] }),
        document,
    }
}

/// Provisioner instrumentado: registra llamadas y puede observar el estado de
/// la App en el momento del drop (para verificar el orden de borrado).
#[derive(Clone, Default)]
struct ProbeProvisioner {
    calls: Arc<Mutex<Vec<String>>>,
    fail_drop: bool,
    store: Option<MemoryStore>,
    watch: Arc<Mutex<Option<(Uuid, Uuid)>>>,
    status_at_drop: Arc<Mutex<Option<AppStatus>>>,
}

#[async_trait]
impl SchemaProvisioner for ProbeProvisioner {
    async fn provision(
        &self,
        schema_name: &str,
        blueprint: &Blueprint,
    ) -> Result<(), ProvisionError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("provision:{schema_name}:{}", blueprint.tables().len()));
        Ok(())
    }

    async fn drop_schema(&self, schema_name: &str) -> Result<(), ProvisionError> {
        let watched = *self.watch.lock().unwrap();
        if let (Some(store), Some((app_id, owner))) = (&self.store, watched) {
            let status = store.get_app(app_id, owner).await.unwrap().map(|a| a.status);
            *self.status_at_drop.lock().unwrap() = status;
        }
        self.calls.lock().unwrap().push(format!("drop:{schema_name}"));
        if self.fail_drop {
            return Err(ProvisionError::Ddl("drop refused by test".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct NoopDeployer;

#[async_trait]
impl BackendDeployer for NoopDeployer {
    async fn deploy(
        &self,
        _app_id: Uuid,
        _blueprint: &Blueprint,
        db_schema: &str,
    ) -> Result<DeployedBackend, DeployError> {
        Ok(DeployedBackend { base_url: format!("http://localhost:4001/{db_schema}"), port: 4001 })
    }

    async fn remove(&self, _app_id: Uuid) -> Result<(), DeployError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Documentos de prueba
// ---------------------------------------------------------------------------

fn todo_doc(entity: &str) -> Value {
    json!({
        "version": 3,
        "app": { "name": "Todo", "slug": "todo" },
        "backend": { "generator": "amplication" },
        "data": {
            "tables": [{
                "name": entity,
                "columns": [
                    { "name": "title", "type": "text", "required": true },
                    { "name": "done", "type": "bool", "default": false }
                ]
            }],
            "relationships": []
        },
        "security": { "roles": [{ "name": "Admin" }], "permissions": [] },
        "ui": {
            "navigation": [],
            "pages": [{
                "id": "main",
                "blocks": [{ "id": "list", "type": "TABLE", "dataSource": { "entity": entity } }]
            }]
        }
    })
}

fn pipeline_with(
    store: MemoryStore,
    llm: ScriptedLlm,
    provisioner: ProbeProvisioner,
) -> GenerationPipeline<MemoryStore, ScriptedLlm, ProbeProvisioner, NoopDeployer> {
    GenerationPipeline::new(store, llm, provisioner, NoopDeployer, BackendMode::SqlSchema)
}

// ---------------------------------------------------------------------------
// Escenario 1: documento válido a la primera
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generacion_valida_termina_running_con_runtime_y_schema() {
    let store = MemoryStore::new();
    let provisioner = ProbeProvisioner::default();
    let llm = ScriptedLlm::new(vec![Ok(exchange(todo_doc("Task")))]);
    let pipeline = pipeline_with(store.clone(), llm, provisioner.clone());
    let owner = Uuid::new_v4();

    let out = pipeline
        .run_generation(owner, "a todo app", None)
        .await
        .expect("generation ok");

    let app = store.get_app(out.app_id, owner).await.unwrap().unwrap();
    assert_eq!(app.status, AppStatus::Running);
    assert_eq!(app.name, "Todo");
    assert_eq!(app.slug, "todo");

    let job = store.get_job(out.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Succeeded);
    assert!(job.llm_request.is_some() && job.llm_response.is_some());

    let runtime = store.get_runtime_config(out.app_id).await.unwrap().unwrap();
    assert!(runtime.enabled);
    assert_eq!(runtime.public_base_path, "/apps/todo");

    let snapshot = store.latest_snapshot(out.app_id).await.unwrap().unwrap();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.validation_status, ValidationStatus::Valid);
    assert_eq!(snapshot.blueprint_hash.len(), 64);

    let calls = provisioner.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![format!("provision:{}:1", runtime.db_schema)]);
}

// ---------------------------------------------------------------------------
// Escenario 2: una ronda de reparación corrige el casing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reparacion_exitosa_tras_error_de_identificador() {
    let store = MemoryStore::new();
    let llm = ScriptedLlm::new(vec![
        Ok(exchange(todo_doc("task"))), // inválido: minúscula en V3
        Ok(exchange(todo_doc("Task"))), // reparado
    ]);
    let pipeline = pipeline_with(store.clone(), llm, ProbeProvisioner::default());
    let owner = Uuid::new_v4();

    let out = pipeline
        .run_generation(owner, "a todo app", None)
        .await
        .expect("generation ok after repair");

    let app = store.get_app(out.app_id, owner).await.unwrap().unwrap();
    assert_eq!(app.status, AppStatus::Running);
    let job = store.get_job(out.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Succeeded);
    let snapshot = store.latest_snapshot(out.app_id).await.unwrap().unwrap();
    assert_eq!(snapshot.validation_status, ValidationStatus::Valid);
    assert_eq!(snapshot.blueprint_json["data"]["tables"][0]["name"], "Task");
}

// ---------------------------------------------------------------------------
// Escenario 3: la reparación no resuelve el rol colgante
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reparacion_fallida_deja_job_failed_y_blueprint_invalido() {
    let mut bad = todo_doc("Task");
    bad["security"]["permissions"] = json!([
        { "role": "Editor", "entity": "Task",
          "actions": { "create": true, "read": true, "update": true, "delete": true } }
    ]);

    let store = MemoryStore::new();
    let llm = ScriptedLlm::new(vec![Ok(exchange(bad.clone())), Ok(exchange(bad))]);
    let provisioner = ProbeProvisioner::default();
    let pipeline = pipeline_with(store.clone(), llm, provisioner.clone());
    let owner = Uuid::new_v4();

    let out = pipeline
        .run_generation(owner, "a todo app", None)
        .await
        .expect("invalid outcome is terminal, not an exception");

    let app = store.get_app(out.app_id, owner).await.unwrap().unwrap();
    assert_eq!(app.status, AppStatus::Error);

    let job = store.get_job(out.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("Editor"));

    let snapshot = store.latest_snapshot(out.app_id).await.unwrap().unwrap();
    assert_eq!(snapshot.validation_status, ValidationStatus::Invalid);
    let errors = snapshot.validation_errors.unwrap();
    assert!(errors["errors"].as_array().unwrap().iter().any(|e| {
        e.as_str().unwrap().contains("non-existent role 'Editor'")
    }));

    // Nada se aprovisionó.
    assert!(provisioner.calls.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Fallo de transporte del LLM: excepción registrada y re-lanzada
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fallo_del_llm_se_registra_y_se_relanza() {
    let store = MemoryStore::new();
    let llm = ScriptedLlm::new(vec![Err(LlmError::Transport("connection reset".into()))]);
    let pipeline = pipeline_with(store.clone(), llm, ProbeProvisioner::default());
    let owner = Uuid::new_v4();

    let err = pipeline
        .run_generation(owner, "a todo app", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection reset"));

    // Job y App quedaron consultables y con el fallo anotado.
    let apps = store.list_apps(owner).await.unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].status, AppStatus::Error);
}

// ---------------------------------------------------------------------------
// Generaciones repetidas acumulan versiones, nunca mutan las previas
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerar_crea_nueva_version_de_blueprint() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();

    let llm = ScriptedLlm::new(vec![Ok(exchange(todo_doc("Task")))]);
    let pipeline = pipeline_with(store.clone(), llm, ProbeProvisioner::default());
    let first = pipeline.run_generation(owner, "a todo app", None).await.unwrap();

    let llm = ScriptedLlm::new(vec![Ok(exchange(todo_doc("Chore")))]);
    let pipeline = pipeline_with(store.clone(), llm, ProbeProvisioner::default());
    let second = pipeline.run_generation(owner, "a chore app", None).await.unwrap();

    assert_ne!(first.app_id, second.app_id);
    assert_ne!(first.job_id, second.job_id);
    // Cada app arranca su propia historia de versiones en 1.
    let snap = store.latest_snapshot(second.app_id).await.unwrap().unwrap();
    assert_eq!(snap.version, 1);
}

// ---------------------------------------------------------------------------
// Orden de borrado: DELETING visible antes del drop; filas fuera aunque el
// drop lance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn borrado_marca_deleting_antes_del_drop_y_sobrevive_drop_fallido() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();

    let llm = ScriptedLlm::new(vec![Ok(exchange(todo_doc("Task")))]);
    let mut provisioner = ProbeProvisioner::default();
    provisioner.store = Some(store.clone());
    provisioner.fail_drop = true;
    let pipeline = pipeline_with(store.clone(), llm, provisioner.clone());

    let out = pipeline.run_generation(owner, "a todo app", None).await.unwrap();
    *provisioner.watch.lock().unwrap() = Some((out.app_id, owner));

    let deleted = pipeline.delete_app(out.app_id, owner).await.unwrap();
    assert!(deleted);

    // El drop observó la App ya en DELETING.
    assert_eq!(
        *provisioner.status_at_drop.lock().unwrap(),
        Some(AppStatus::Deleting)
    );
    // Y pese al drop fallido no sobrevive ninguna fila dependiente.
    assert!(store.get_app(out.app_id, owner).await.unwrap().is_none());
    assert!(store.get_job(out.job_id).await.unwrap().is_none());
    assert!(store.latest_snapshot(out.app_id).await.unwrap().is_none());
    assert!(store.get_runtime_config(out.app_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Slugs en colisión entre apps distintas
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slugs_duplicados_reciben_sufijo() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();

    for expected in ["todo", "todo-1"] {
        let llm = ScriptedLlm::new(vec![Ok(exchange(todo_doc("Task")))]);
        let pipeline = pipeline_with(store.clone(), llm, ProbeProvisioner::default());
        let out = pipeline.run_generation(owner, "a todo app", None).await.unwrap();
        let app = store.get_app(out.app_id, owner).await.unwrap().unwrap();
        assert_eq!(app.slug, expected);
    }
}
