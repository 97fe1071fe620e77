// forge-domain library entry point
pub mod app;
pub mod blueprint;
pub mod error;
pub mod job;
pub mod runtime_config;
pub mod slug;
pub mod snapshot;

pub use app::{App, AppStatus};
pub use blueprint::{Blueprint, BlueprintVersion, ForeignKeyEdge};
pub use error::DomainError;
pub use job::{GenerationJob, JobStatus};
pub use runtime_config::AppRuntimeConfig;
pub use snapshot::{BlueprintSnapshot, ValidationStatus};
