//! DDL embebido del propio plano de control.
//!
//! Las cuatro tablas (apps, jobs, snapshots, runtime config) viven en el
//! schema `control_plane` y se crean idempotentes al construir el pool, una
//! sola vez. Los schemas de las apps generadas NO se tocan aquí: eso es
//! asunto del provisioner.

use sqlx::PgPool;

use crate::error::PersistenceError;

const BOOTSTRAP_SQL: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS pgcrypto",
    "CREATE SCHEMA IF NOT EXISTS control_plane",
    r#"CREATE TABLE IF NOT EXISTS control_plane.apps (
        id UUID PRIMARY KEY,
        owner_user_id UUID NOT NULL,
        name VARCHAR(255) NOT NULL,
        slug VARCHAR(100) NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'DRAFT',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS control_plane.generation_jobs (
        id UUID PRIMARY KEY,
        app_id UUID NOT NULL REFERENCES control_plane.apps(id),
        status TEXT NOT NULL DEFAULT 'QUEUED',
        model VARCHAR(100) NOT NULL,
        prompt TEXT NOT NULL,
        llm_request JSONB,
        llm_response JSONB,
        error_message TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS control_plane.app_blueprints (
        id UUID PRIMARY KEY,
        app_id UUID NOT NULL REFERENCES control_plane.apps(id),
        version INTEGER NOT NULL DEFAULT 1,
        blueprint_json JSONB NOT NULL,
        blueprint_hash VARCHAR(64),
        validation_status TEXT NOT NULL DEFAULT 'VALID',
        validation_errors JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (app_id, version)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS control_plane.app_runtime_config (
        app_id UUID PRIMARY KEY REFERENCES control_plane.apps(id),
        db_schema VARCHAR(100) NOT NULL,
        public_base_path VARCHAR(255) NOT NULL,
        enabled BOOLEAN NOT NULL DEFAULT false
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_app_id ON control_plane.generation_jobs (app_id)",
    "CREATE INDEX IF NOT EXISTS idx_blueprints_app_id ON control_plane.app_blueprints (app_id)",
];

/// Ejecuta el set completo de DDL de arranque (idempotente).
pub async fn run_bootstrap(pool: &PgPool) -> Result<(), PersistenceError> {
    for statement in BOOTSTRAP_SQL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
