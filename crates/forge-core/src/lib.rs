//! forge-core: validación, hashing y orquestación del plano de control.
pub mod errors;
pub mod graph;
pub mod hashing;
pub mod llm;
pub mod pipeline;
pub mod provision;
pub mod slug;
pub mod store;
pub mod validate;

pub use errors::CoreError;
pub use graph::{dependency_order, table_creation_order, GraphError};
pub use hashing::{hash_blueprint, to_canonical_json};
pub use llm::{LlmClient, LlmError, LlmExchange};
pub use pipeline::{BackendMode, GenerationOutcome, GenerationPipeline};
pub use provision::{BackendDeployer, DeployError, ProvisionError, SchemaProvisioner};
pub use slug::ensure_unique_slug;
pub use store::{ControlStore, MemoryStore, StoreError};
pub use validate::{validate_blueprint, ValidationOutcome};
