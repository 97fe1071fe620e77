//! Contratos de aprovisionamiento físico: schema SQL y backend generado.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use forge_domain::Blueprint;

use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// El nombre de schema no pasó el guard `[A-Za-z0-9_]` (única defensa de
    /// inyección para un identificador interpolado en DDL: se rechaza, no se
    /// escapa).
    #[error("invalid schema name '{0}'")]
    InvalidSchemaName(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Fallo de DDL distinto de FKs (creación de schema o tabla): fatal.
    #[error("ddl execution failed: {0}")]
    Ddl(String),
}

#[async_trait]
pub trait SchemaProvisioner: Send + Sync {
    /// Compila el Blueprint en DDL dentro de `schema_name`, en una sola
    /// transacción. Un ciclo de dependencias aborta sin schema parcial.
    async fn provision(&self, schema_name: &str, blueprint: &Blueprint)
        -> Result<(), ProvisionError>;

    /// Drop en cascada del namespace completo. Irreversible.
    async fn drop_schema(&self, schema_name: &str) -> Result<(), ProvisionError>;
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("no free port available in the allocator range")]
    PortsExhausted,

    #[error("deploy failed: {0}")]
    Failed(String),
}

/// Resultado de desplegar un backend generado.
#[derive(Debug, Clone)]
pub struct DeployedBackend {
    pub base_url: String,
    pub port: u16,
}

#[async_trait]
pub trait BackendDeployer: Send + Sync {
    /// Genera y publica el servicio de un Blueprint validado. Devuelve la URL
    /// base alcanzable o falla; el core sólo consume éxito/fracaso + URL.
    async fn deploy(
        &self,
        app_id: Uuid,
        blueprint: &Blueprint,
        db_schema: &str,
    ) -> Result<DeployedBackend, DeployError>;

    /// Elimina los artefactos desplegados de una app (best-effort en el
    /// borrado de la App).
    async fn remove(&self, app_id: Uuid) -> Result<(), DeployError>;
}
