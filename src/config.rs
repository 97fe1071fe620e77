//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//! También provee `create_pool` para obtener un pool de conexiones a PostgreSQL
//! que será usado por el store del plano de control y el provisioner.
use once_cell::sync::Lazy;
use std::env;

use forge_core::BackendMode;

/// Configuración global de la aplicación.
pub struct AppConfig {
    /// Configuración específica de base de datos.
    pub database: DatabaseConfig,
    /// Colaborador LLM (endpoint compatible OpenRouter).
    pub llm: LlmSettings,
    /// Servidor HTTP y destino físico de los Blueprints aceptados.
    pub server: ServerConfig,
}

/// Parámetros de conexión a la base de datos.
pub struct DatabaseConfig {
    /// URL completa de conexión (postgres://...).
    pub url: String,
    /// Número mínimo de conexiones en el pool.
    pub min_connections: u32,
    /// Número máximo de conexiones en el pool.
    pub max_connections: u32,
}

pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

pub struct ServerConfig {
    pub bind_addr: String,
    pub backend_mode: BackendMode,
    /// Directorio de trabajo de los backends generados.
    pub generated_apps_path: String,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    forge_persistence::init_dotenv();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let min = env::var("DATABASE_MIN_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2);
    let max = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let backend_mode = match env::var("BACKEND_MODE").as_deref() {
        Ok("service") => BackendMode::GeneratedService,
        _ => BackendMode::SqlSchema,
    };
    AppConfig {
        database: DatabaseConfig { url, min_connections: min, max_connections: max },
        llm: LlmSettings {
            api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
        },
        server: ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            backend_mode,
            generated_apps_path: env::var("GENERATED_APPS_PATH")
                .unwrap_or_else(|_| "/var/lib/appforge-apps".to_string()),
        },
    }
});

/// Crea un pool de conexiones PostgreSQL basado en la configuración cargada.
/// Devuelve un `Result` que permite propagar errores de conexión; el
/// bootstrap del plano de control corre una sola vez al construirlo.
pub async fn create_pool(
) -> Result<sqlx::Pool<sqlx::Postgres>, forge_persistence::PersistenceError> {
    forge_persistence::build_pool(
        &CONFIG.database.url,
        CONFIG.database.min_connections,
        CONFIG.database.max_connections,
    )
    .await
}
