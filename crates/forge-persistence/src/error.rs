//! Errores de persistencia.
//! Mapea errores de sqlx a variantes semánticas del dominio de persistencia.

use thiserror::Error;

use forge_core::store::StoreError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("not found")]
    NotFound,

    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),

    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) => {
                // SQLSTATE 23505 = unique_violation, 23503 = fk_violation
                match db.code().as_deref() {
                    Some("23505") => Self::UniqueViolation(db.message().to_string()),
                    Some("23503") => Self::ForeignKeyViolation(db.message().to_string()),
                    _ => Self::Unknown(db.message().to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::TransientIo(err.to_string())
            }
            sqlx::Error::Io(e) => Self::TransientIo(e.to_string()),
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}
