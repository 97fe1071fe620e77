//! Mapeo de errores del core a respuestas HTTP estructuradas.
//! El cliente nunca necesita parsear stack traces: ve el status de la App y
//! el `error_message` del Job; acá sólo se forma el JSON `{error}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use forge_core::store::StoreError;
use forge_core::CoreError;
use forge_domain::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No existe o no es del caller: misma respuesta en ambos casos.
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    /// Transición de estado ilegal para la operación pedida.
    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse { error: self.to_string() });
        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Store(StoreError::NotFound) => ApiError::NotFound,
            CoreError::Store(StoreError::Domain(DomainError::IllegalTransition {
                from,
                to,
            })) => ApiError::Conflict(format!("illegal status transition {from} -> {to}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::from(CoreError::Store(e))
    }
}
