//! Contrato estructural V3: entidades PascalCase, campos camelCase, roles
//! estructurados, sección `backend` para el generador de servicio y data
//! sources vinculados por `entity`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{ModalSpec, NavItem, PageSpec, RelationKind, TableSpec, Theme};

/// Generadores de backend soportados por el plano de control.
pub const SUPPORTED_GENERATORS: &[&str] = &["amplication"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoV3 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSpec {
    pub generator: String,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub auth: Option<Value>,
}

/// Relación V3: nombrada, sin columnas explícitas. La columna propietaria se
/// deriva como `<name>Id` en el lado many_to_one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRelationship {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    #[serde(rename = "fromTable")]
    pub from_table: String,
    #[serde(rename = "toTable")]
    pub to_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataV3 {
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub relationships: Vec<NamedRelationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// Flags de acción V3: conjunto cerrado create/read/update/delete.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionFlags {
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionV3 {
    pub role: String,
    pub entity: String,
    pub actions: ActionFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityV3 {
    pub roles: Vec<RoleSpec>,
    pub permissions: Vec<PermissionV3>,
}

/// Data source V3: vinculado por nombre de entidad (PascalCase).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDataSource {
    pub entity: String,
    #[serde(default)]
    pub filters: Option<Vec<Value>>,
    #[serde(rename = "orderBy", default)]
    pub order_by: Option<Vec<Value>>,
    #[serde(default)]
    pub include: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiV3 {
    pub navigation: Vec<NavItem>,
    pub pages: Vec<PageSpec<EntityDataSource>>,
    #[serde(default)]
    pub modals: Option<Vec<ModalSpec<EntityDataSource>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintV3 {
    pub version: i64,
    pub app: AppInfoV3,
    pub backend: BackendSpec,
    pub data: DataV3,
    pub security: SecurityV3,
    pub ui: UiV3,
}
