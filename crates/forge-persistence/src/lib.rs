//! forge-persistence
//!
//! Capa Postgres (sqlx) del plano de control:
//! - `pg`: implementación de `ControlStore` sobre un pool sqlx.
//! - `provision`: compilador/ejecutor de DDL para schemas de apps (y drop).
//! - `bootstrap`: DDL embebido de las tablas del propio plano de control,
//!   ejecutado una sola vez al construir el pool.
//! - `config`: carga de configuración desde .env.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod pg;
pub mod provision;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, PgControlStore};
pub use provision::PgProvisioner;
