//! Tareas de generación desprendidas ("fire-and-forget" con supervisor).
//!
//! La llamada HTTP responde de inmediato con los ids; el pipeline corre en su
//! propia tarea tokio. Un supervisor aparte espera el JoinHandle y, si la
//! tarea murió sin veredicto (panic/abort), reconcilia Job FAILED / App ERROR
//! sobre las filas. No hay cancelación expuesta: una generación iniciada
//! corre hasta su desenlace.
//!
//! Nota operativa: sin cola durable, un crash del proceso completo deja el
//! Job en RUNNING sin recuperación automática (sin sweep de reconciliación).

use log::{error, info};
use std::sync::Arc;

use forge_core::llm::LlmClient;
use forge_core::provision::{BackendDeployer, SchemaProvisioner};
use forge_core::store::ControlStore;
use forge_core::GenerationPipeline;
use forge_domain::{App, GenerationJob};

pub fn spawn_generation<S, L, P, D>(
    pipeline: Arc<GenerationPipeline<S, L, P, D>>,
    app: App,
    job: GenerationJob,
) where
    S: ControlStore + 'static,
    L: LlmClient + 'static,
    P: SchemaProvisioner + 'static,
    D: BackendDeployer + 'static,
{
    let worker = {
        let pipeline = Arc::clone(&pipeline);
        let app = app.clone();
        let job = job.clone();
        tokio::spawn(async move {
            let prompt = job.prompt.clone();
            let model = job.model.clone();
            pipeline.run_prepared(&app, &job, &prompt, &model).await
        })
    };

    // Done-callback: loggea el desenlace y cubre el caso sin veredicto.
    tokio::spawn(async move {
        match worker.await {
            Ok(Ok(())) => info!("generation job {} finished", job.id),
            // El pipeline ya registró el fallo sobre Job/App; acá sólo se
            // deja constancia a nivel proceso.
            Ok(Err(e)) => error!("generation job {} failed: {e}", job.id),
            Err(join_err) => {
                error!("generation job {} died without verdict: {join_err}", job.id);
                pipeline
                    .reconcile_failure(job.id, app.id, "generation task aborted")
                    .await;
            }
        }
    });
}
