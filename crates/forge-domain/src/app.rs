//! Registro App y su máquina de estados.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Estado de una aplicación generada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppStatus {
    Draft,
    Running,
    Stopped,
    Error,
    Deleting,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Draft => "DRAFT",
            AppStatus::Running => "RUNNING",
            AppStatus::Stopped => "STOPPED",
            AppStatus::Error => "ERROR",
            AppStatus::Deleting => "DELETING",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "DRAFT" => Ok(AppStatus::Draft),
            "RUNNING" => Ok(AppStatus::Running),
            "STOPPED" => Ok(AppStatus::Stopped),
            "ERROR" => Ok(AppStatus::Error),
            "DELETING" => Ok(AppStatus::Deleting),
            other => Err(DomainError::Validation(format!("unknown app status '{other}'"))),
        }
    }

    /// DELETING es terminal: precede a la destrucción física del registro.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppStatus::Deleting)
    }

    /// Tabla de transiciones legales:
    /// DRAFT -> RUNNING, RUNNING <-> STOPPED, no-terminal -> ERROR,
    /// cualquiera -> DELETING.
    pub fn can_transition(&self, to: AppStatus) -> bool {
        match (self, to) {
            (_, AppStatus::Deleting) => true,
            (from, AppStatus::Error) => !from.is_terminal() && *from != AppStatus::Error,
            (AppStatus::Draft, AppStatus::Running) => true,
            (AppStatus::Running, AppStatus::Stopped) => true,
            (AppStatus::Stopped, AppStatus::Running) => true,
            _ => false,
        }
    }

    /// Valida la transición devolviendo el estado destino, o el error de
    /// transición ilegal correspondiente.
    pub fn transition(&self, to: AppStatus) -> Result<AppStatus, DomainError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(DomainError::IllegalTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

/// Aplicación de un tenant: fila del plano de control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: AppStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl App {
    /// Crea una App nueva en DRAFT con timestamps actuales.
    pub fn new_draft(owner_user_id: Uuid, name: String, slug: String) -> Self {
        let now = Utc::now();
        App {
            id: Uuid::new_v4(),
            owner_user_id,
            name,
            slug,
            status: AppStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_solo_arranca_hacia_running() {
        assert!(AppStatus::Draft.can_transition(AppStatus::Running));
        assert!(!AppStatus::Draft.can_transition(AppStatus::Stopped));
    }

    #[test]
    fn running_y_stopped_alternan() {
        assert!(AppStatus::Running.can_transition(AppStatus::Stopped));
        assert!(AppStatus::Stopped.can_transition(AppStatus::Running));
        assert!(!AppStatus::Stopped.can_transition(AppStatus::Draft));
    }

    #[test]
    fn error_alcanzable_desde_no_terminales() {
        assert!(AppStatus::Draft.can_transition(AppStatus::Error));
        assert!(AppStatus::Running.can_transition(AppStatus::Error));
        assert!(AppStatus::Stopped.can_transition(AppStatus::Error));
        assert!(!AppStatus::Deleting.can_transition(AppStatus::Error));
    }

    #[test]
    fn deleting_es_terminal_y_universal() {
        for from in [
            AppStatus::Draft,
            AppStatus::Running,
            AppStatus::Stopped,
            AppStatus::Error,
        ] {
            assert!(from.can_transition(AppStatus::Deleting));
        }
        assert!(!AppStatus::Deleting.can_transition(AppStatus::Running));
    }

    #[test]
    fn transition_reporta_origen_y_destino() {
        let err = AppStatus::Deleting.transition(AppStatus::Running).unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: "DELETING".to_string(),
                to: "RUNNING".to_string()
            }
        );
    }
}
