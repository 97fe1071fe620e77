//! Errores del core (el orquestador los registra en Job/App y los re-lanza).

use thiserror::Error;

use crate::llm::LlmError;
use crate::provision::{DeployError, ProvisionError};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Domain(#[from] forge_domain::DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("internal: {0}")]
    Internal(String),
}
