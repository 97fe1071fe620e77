//! Snapshot inmutable de un Blueprint persistido.
//!
//! Una vez alcanzado el veredicto de validación el snapshot no se muta:
//! reparaciones y ediciones crean un registro de versión nuevo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::Invalid => "INVALID",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "VALID" => Ok(ValidationStatus::Valid),
            "INVALID" => Ok(ValidationStatus::Invalid),
            other => Err(DomainError::Validation(format!(
                "unknown validation status '{other}'"
            ))),
        }
    }
}

/// Snapshot direccionado por contenido: `blueprint_hash` es el SHA-256 del
/// JSON canónico, y el JSON se guarda verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintSnapshot {
    pub id: Uuid,
    pub app_id: Uuid,
    pub version: i32,
    pub blueprint_json: Value,
    pub blueprint_hash: String,
    pub validation_status: ValidationStatus,
    pub validation_errors: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl BlueprintSnapshot {
    pub fn new(
        app_id: Uuid,
        version: i32,
        blueprint_json: Value,
        blueprint_hash: String,
        validation_status: ValidationStatus,
        validation_errors: Option<Vec<String>>,
    ) -> Self {
        BlueprintSnapshot {
            id: Uuid::new_v4(),
            app_id,
            version,
            blueprint_json,
            blueprint_hash,
            validation_status,
            validation_errors: validation_errors
                .map(|errors| serde_json::json!({ "errors": errors })),
            created_at: Utc::now(),
        }
    }
}
