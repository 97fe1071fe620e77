//! Registro GenerationJob: un intento de producir un Blueprint para una App.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "RUNNING" => Ok(JobStatus::Running),
            "SUCCEEDED" => Ok(JobStatus::Succeeded),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(DomainError::Validation(format!("unknown job status '{other}'"))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// QUEUED -> RUNNING -> {SUCCEEDED, FAILED}; un job nunca retrocede.
    pub fn can_transition(&self, to: JobStatus) -> bool {
        matches!(
            (self, to),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Succeeded)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn transition(&self, to: JobStatus) -> Result<JobStatus, DomainError> {
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

/// Un intento de generación. Los payloads crudos del LLM se conservan como
/// blobs semiestructurados, sólo para auditoría y depuración.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: Uuid,
    pub app_id: Uuid,
    pub status: JobStatus,
    pub model: String,
    pub prompt: String,
    pub llm_request: Option<Value>,
    pub llm_response: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    pub fn new_running(app_id: Uuid, model: String, prompt: String) -> Self {
        let now = Utc::now();
        GenerationJob {
            id: Uuid::new_v4(),
            app_id,
            status: JobStatus::Running,
            model,
            prompt,
            llm_request: None,
            llm_response: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
