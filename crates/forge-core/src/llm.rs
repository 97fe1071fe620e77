//! Contrato del colaborador LLM.
//!
//! El core sólo necesita dos operaciones (generar y reparar) y conserva los
//! payloads crudos como blobs opacos para auditoría. El shape del wire
//! upstream es asunto del provider.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm transport error: {0}")]
    Transport(String),

    #[error("llm api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Respuesta no-JSON o sin el contenido esperado: fallo duro del intento.
    #[error("malformed llm response: {0}")]
    MalformedResponse(String),
}

/// Intercambio completo con el LLM: documento extraído + payloads crudos.
#[derive(Debug, Clone)]
pub struct LlmExchange {
    /// Documento JSON parseado del contenido de la respuesta.
    pub document: Value,
    /// Payload del request tal cual se envió (auditoría).
    pub request: Value,
    /// Payload de la respuesta tal cual llegó (auditoría).
    pub response: Value,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Modelo usado cuando el request no especifica uno.
    fn default_model(&self) -> &str;

    /// Genera un Blueprint a partir del prompt del usuario.
    async fn generate(&self, prompt: &str, model: &str) -> Result<LlmExchange, LlmError>;

    /// Ronda de reparación: reenvía el prompt original junto con el JSON
    /// inválido y los errores de validación concatenados.
    async fn repair(
        &self,
        original_prompt: &str,
        invalid_json: &str,
        validation_errors: &str,
        model: &str,
    ) -> Result<LlmExchange, LlmError>;
}
