//! Binario del servidor: arma colaboradores, pipeline y router, y atiende.

use std::sync::Arc;

use log::info;

use appforge_rust::api::{router, ApiState};
use appforge_rust::config::CONFIG;
use forge_core::GenerationPipeline;
use forge_persistence::provision::PgProvisioner;
use forge_persistence::PgControlStore;
use forge_providers::{LlmConfig, LocalBackendDeployer, OpenRouterClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pool = appforge_rust::config::create_pool().await?;
    info!("control plane bootstrap done");

    let store = PgControlStore::new(pool.clone());
    let provisioner = PgProvisioner::new(pool);
    let llm = OpenRouterClient::new(LlmConfig::new(
        CONFIG.llm.api_key.clone(),
        CONFIG.llm.base_url.clone(),
        CONFIG.llm.model.clone(),
    ))?;
    let deployer = LocalBackendDeployer::new(&CONFIG.server.generated_apps_path);

    let pipeline = GenerationPipeline::new(
        store,
        llm,
        provisioner,
        deployer,
        CONFIG.server.backend_mode,
    );
    let state = ApiState { pipeline: Arc::new(pipeline) };

    let listener = tokio::net::TcpListener::bind(&CONFIG.server.bind_addr).await?;
    info!("appforge listening on {}", CONFIG.server.bind_addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
