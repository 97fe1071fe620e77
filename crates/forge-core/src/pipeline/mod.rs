//! Orquestador de generación y ciclo de vida de Apps.
//!
//! Máquina por request:
//! `CREATED -> LLM_CALLED -> VALIDATING -> (VALID -> PROVISIONING ->
//! SUCCEEDED) | (INVALID -> REPAIR_REQUESTED -> VALIDATING) | FAILED`.
//!
//! Garantías que este módulo sostiene:
//! - App y Job existen (y quedan consultables) ANTES de llamar al LLM, para
//!   que el id de job sirva de auditoría aunque la llamada falle.
//! - A lo sumo UNA ronda de reparación (tope de costo/latencia, no un loop).
//! - Un resultado inválido tras la reparación es terminal: snapshot INVALID
//!   persistido con sus errores, Job FAILED, App ERROR.
//! - Los fallos de infraestructura se registran sobre Job/App y se re-lanzan
//!   al supervisor; nunca se tragan en silencio.
//! - Re-ejecutar la generación de una App crea Job y versión de Blueprint
//!   nuevos; jamás muta versiones previas.

use log::{error, info, warn};
use serde_json::Value;
use uuid::Uuid;

use forge_domain::{
    App, AppRuntimeConfig, AppStatus, Blueprint, BlueprintSnapshot, BlueprintVersion,
    GenerationJob, ValidationStatus,
};

use crate::errors::CoreError;
use crate::hashing::hash_blueprint;
use crate::llm::LlmClient;
use crate::provision::{BackendDeployer, SchemaProvisioner};
use crate::slug::ensure_unique_slug;
use crate::store::ControlStore;
use crate::validate::{validate_blueprint, ValidationOutcome};

/// Destino físico de un Blueprint aceptado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Sólo schema SQL aprovisionado en el Postgres compartido.
    SqlSchema,
    /// Schema SQL + servicio generado desplegado por el colaborador.
    GeneratedService,
}

/// Identificadores devueltos al caller que encola la generación.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOutcome {
    pub job_id: Uuid,
    pub app_id: Uuid,
}

pub struct GenerationPipeline<S, L, P, D>
where
    S: ControlStore,
    L: LlmClient,
    P: SchemaProvisioner,
    D: BackendDeployer,
{
    store: S,
    llm: L,
    provisioner: P,
    deployer: D,
    mode: BackendMode,
    blueprint_version: BlueprintVersion,
}

impl<S, L, P, D> GenerationPipeline<S, L, P, D>
where
    S: ControlStore,
    L: LlmClient,
    P: SchemaProvisioner,
    D: BackendDeployer,
{
    pub fn new(store: S, llm: L, provisioner: P, deployer: D, mode: BackendMode) -> Self {
        GenerationPipeline {
            store,
            llm,
            provisioner,
            deployer,
            mode,
            blueprint_version: BlueprintVersion::V3,
        }
    }

    /// Fija la versión de contrato que se le pide al LLM (V3 por defecto).
    pub fn with_blueprint_version(mut self, version: BlueprintVersion) -> Self {
        self.blueprint_version = version;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Primera fase: crea App(DRAFT) + Job(RUNNING) y los deja committeados
    /// ANTES de cualquier llamada al LLM, de modo que el id de job exista
    /// para auditoría aunque la llamada falle. El caller puede responder con
    /// los ids de inmediato y correr `run_prepared` como tarea desprendida.
    pub async fn create_records(
        &self,
        owner: Uuid,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<(App, GenerationJob), CoreError> {
        // Nombre/slug provisionales a partir del prompt; el Blueprint los
        // reemplaza al validar.
        let temp_name: String = prompt.chars().take(50).collect::<String>().trim().to_string();
        let temp_slug = ensure_unique_slug(&self.store, &temp_name, None).await?;

        let app = App::new_draft(owner, temp_name, temp_slug);
        self.store.insert_app(&app).await?;

        let model = model.unwrap_or_else(|| self.llm.default_model()).to_string();
        let job = GenerationJob::new_running(app.id, model, prompt.to_string());
        self.store.insert_job(&job).await?;
        Ok((app, job))
    }

    /// Segunda fase: ejecuta el pipeline sobre registros ya creados. Un `Err`
    /// aquí es un fallo de infraestructura ya anotado en Job/App y
    /// re-lanzado al supervisor.
    pub async fn run_prepared(
        &self,
        app: &App,
        job: &GenerationJob,
        prompt: &str,
        model: &str,
    ) -> Result<(), CoreError> {
        match self.execute(app, job, prompt, model).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("generation failed for app {}: {e}", app.id);
                self.reconcile_failure(job.id, app.id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Conveniencia síncrona (tests, CLI): ambas fases encadenadas.
    pub async fn run_generation(
        &self,
        owner: Uuid,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<GenerationOutcome, CoreError> {
        let (app, job) = self.create_records(owner, prompt, model).await?;
        let outcome = GenerationOutcome { job_id: job.id, app_id: app.id };
        let model = job.model.clone();
        self.run_prepared(&app, &job, prompt, &model).await?;
        Ok(outcome)
    }

    /// Cuerpo del pipeline; separado para que `run_generation` pueda anotar
    /// cualquier error en Job/App antes de re-lanzarlo.
    async fn execute(
        &self,
        app: &App,
        job: &GenerationJob,
        prompt: &str,
        model: &str,
    ) -> Result<(), CoreError> {
        let exchange = self.llm.generate(prompt, model).await?;
        self.store
            .attach_job_payloads(job.id, &exchange.request, &exchange.response)
            .await?;

        let mut document = exchange.document;
        let mut outcome = validate_blueprint(&document, self.blueprint_version);

        if !outcome.ok {
            info!(
                "blueprint invalid for app {}, attempting repair ({} errors)",
                app.id,
                outcome.errors.len()
            );
            match self
                .llm
                .repair(
                    prompt,
                    &serde_json::to_string_pretty(&document)
                        .unwrap_or_else(|_| document.to_string()),
                    &outcome.errors.join("\n"),
                    model,
                )
                .await
            {
                Ok(repaired) => {
                    self.store
                        .attach_job_payloads(job.id, &repaired.request, &repaired.response)
                        .await?;
                    document = repaired.document;
                    outcome = validate_blueprint(&document, self.blueprint_version);
                }
                // Un fallo de transporte en la reparación no es fatal: queda
                // en pie el veredicto de la primera validación.
                Err(e) => warn!("repair round failed for app {}: {e}", app.id),
            }
        }

        if !outcome.ok {
            return self.finish_invalid(app, job, &document, outcome).await;
        }

        let blueprint = outcome
            .parsed
            .ok_or_else(|| CoreError::Internal("valid outcome without document".into()))?;
        self.finish_valid(app, job, &document, &blueprint).await
    }

    /// Desenlace terminal sin excepción: el documento no validó ni tras la
    /// reparación. Se persiste igualmente (depuración) como INVALID.
    async fn finish_invalid(
        &self,
        app: &App,
        job: &GenerationJob,
        document: &Value,
        outcome: ValidationOutcome,
    ) -> Result<(), CoreError> {
        let version = self.store.next_snapshot_version(app.id).await?;
        let snapshot = BlueprintSnapshot::new(
            app.id,
            version,
            document.clone(),
            hash_blueprint(document),
            ValidationStatus::Invalid,
            Some(outcome.errors.clone()),
        );
        self.store.insert_snapshot(&snapshot).await?;

        let message = format!(
            "Blueprint validation failed: {}",
            outcome.errors.join("; ")
        );
        self.store.mark_job_failed(job.id, &message).await?;
        self.store.update_app_status(app.id, AppStatus::Error).await?;
        info!("generation for app {} ended invalid: {message}", app.id);
        Ok(())
    }

    async fn finish_valid(
        &self,
        app: &App,
        job: &GenerationJob,
        document: &Value,
        blueprint: &Blueprint,
    ) -> Result<(), CoreError> {
        // Identidad definitiva de la App, con el slug pasado por el asignador
        // (auto-exclusión: renombrar no colisiona consigo mismo).
        let slug = ensure_unique_slug(&self.store, blueprint.app_slug(), Some(app.id)).await?;
        self.store
            .rename_app(app.id, blueprint.app_name(), &slug)
            .await?;

        let version = self.store.next_snapshot_version(app.id).await?;
        let snapshot = BlueprintSnapshot::new(
            app.id,
            version,
            document.clone(),
            hash_blueprint(document),
            ValidationStatus::Valid,
            None,
        );
        self.store.insert_snapshot(&snapshot).await?;

        let runtime = AppRuntimeConfig::new(app.id, &slug);
        self.store.insert_runtime_config(&runtime).await?;

        // Errores de DDL (schema/tabla) abortan la generación completa; los
        // de FK ya quedaron degradados a warning dentro del provisioner.
        self.provisioner
            .provision(&runtime.db_schema, blueprint)
            .await?;

        if self.mode == BackendMode::GeneratedService {
            match self
                .deployer
                .deploy(app.id, blueprint, &runtime.db_schema)
                .await
            {
                Ok(deployed) => info!(
                    "backend for app {} deployed at {}",
                    app.id, deployed.base_url
                ),
                // Preferimos una app parcialmente usable (schema sin
                // servicio) a un fallo total.
                Err(e) => warn!(
                    "backend deploy failed for app {}, continuing with schema only: {e}",
                    app.id
                ),
            }
        }

        self.store.update_app_status(app.id, AppStatus::Running).await?;
        self.store.mark_job_succeeded(job.id).await?;
        info!("app {} generated as '{slug}' (blueprint v{version})", app.id);
        Ok(())
    }

    /// Reconciliación de fallo: deja Job FAILED y App ERROR si aún no lo
    /// están. Las transiciones ya-terminales se ignoran adrede. También la
    /// usa el supervisor de tareas cuando la tarea desprendida muere sin
    /// desenlace registrado.
    pub async fn reconcile_failure(&self, job_id: Uuid, app_id: Uuid, message: &str) {
        if let Err(e) = self.store.mark_job_failed(job_id, message).await {
            warn!("could not mark job {job_id} failed: {e}");
        }
        if let Err(e) = self.store.update_app_status(app_id, AppStatus::Error).await {
            warn!("could not mark app {app_id} errored: {e}");
        }
    }

    /// Arranca una app del owner. `Ok(false)` = no existe o no es suya.
    pub async fn start_app(&self, app_id: Uuid, owner: Uuid) -> Result<bool, CoreError> {
        let changed = self
            .store
            .set_app_status_owned(app_id, owner, AppStatus::Running)
            .await?;
        if changed {
            self.store.set_runtime_enabled(app_id, true).await?;
        }
        Ok(changed)
    }

    /// Detiene una app del owner. `Ok(false)` = no existe o no es suya.
    pub async fn stop_app(&self, app_id: Uuid, owner: Uuid) -> Result<bool, CoreError> {
        let changed = self
            .store
            .set_app_status_owned(app_id, owner, AppStatus::Stopped)
            .await?;
        if changed {
            self.store.set_runtime_enabled(app_id, false).await?;
        }
        Ok(changed)
    }

    /// Borrado en cascada con el orden que exige la limpieza de recursos:
    /// 1) App queda DELETING y committeada (ningún lector concurrente ve una
    ///    app a medio borrar como RUNNING);
    /// 2) drop best-effort del schema físico y del backend desplegado
    ///    (un schema huérfano es preferible a un delete atascado);
    /// 3) filas dependientes y luego la fila de App.
    pub async fn delete_app(&self, app_id: Uuid, owner: Uuid) -> Result<bool, CoreError> {
        let Some(app) = self.store.get_app(app_id, owner).await? else {
            return Ok(false);
        };
        let runtime = self.store.get_runtime_config(app_id).await?;

        self.store
            .update_app_status(app.id, AppStatus::Deleting)
            .await?;

        if let Some(rt) = &runtime {
            if let Err(e) = self.provisioner.drop_schema(&rt.db_schema).await {
                error!("failed to drop schema {} for app {}: {e}", rt.db_schema, app.id);
            }
        }
        if self.mode == BackendMode::GeneratedService {
            if let Err(e) = self.deployer.remove(app.id).await {
                error!("failed to remove deployed backend for app {}: {e}", app.id);
            }
        }

        self.store.delete_app_cascade(app.id).await?;
        info!("app {} deleted", app.id);
        Ok(true)
    }
}
