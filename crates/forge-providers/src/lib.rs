//! forge-providers: colaboradores externos del plano de control.
//!
//! Implementaciones concretas de los contratos que define `forge-core`:
//! cliente LLM (HTTP compatible OpenRouter + mock guionado) y deployer de
//! backends generados (metadata local + asignador de puertos).
pub mod deploy;
pub mod llm;

pub use deploy::{LocalBackendDeployer, MockDeployer, PortAllocator};
pub use llm::{LlmConfig, MockLlmClient, OpenRouterClient};
