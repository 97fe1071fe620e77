//! Configuración de runtime 1:1 con App: dónde vive físicamente la app.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Se crea únicamente cuando un Blueprint fue aceptado. El nombre del schema
/// se deriva del id de la App (nunca de entrada del usuario) para evitar
/// colisiones de namespace e inyección.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRuntimeConfig {
    pub app_id: Uuid,
    pub db_schema: String,
    pub public_base_path: String,
    pub enabled: bool,
}

impl AppRuntimeConfig {
    /// Nombre de schema determinista: `app_` + primeros 12 hex del app id.
    pub fn schema_name_for(app_id: Uuid) -> String {
        let hex = app_id.simple().to_string();
        format!("app_{}", &hex[..12])
    }

    pub fn new(app_id: Uuid, slug: &str) -> Self {
        AppRuntimeConfig {
            app_id,
            db_schema: Self::schema_name_for(app_id),
            public_base_path: format!("/apps/{slug}"),
            enabled: true,
        }
    }
}
