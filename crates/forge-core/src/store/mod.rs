//! Contrato de persistencia del plano de control.
//!
//! El core depende únicamente de semántica insert/update/select/delete con
//! scoping por WHERE; el backend concreto (Postgres, memoria) queda detrás de
//! `ControlStore`. La implementación en memoria vive aquí para tests y como
//! referencia de paridad.

pub mod memory;
pub mod types;

pub use memory::MemoryStore;
pub use types::{ControlStore, StoreError};
