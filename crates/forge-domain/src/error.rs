use thiserror::Error;

/// Error del dominio del plano de control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// El documento no cumple el contrato estructural de su versión.
    #[error("contract error: {0}")]
    Contract(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Contract(e.to_string())
    }
}
