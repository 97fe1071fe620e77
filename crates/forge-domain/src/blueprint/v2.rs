//! Contrato estructural V2: datos/seguridad de V1 más UI de páginas y
//! bloques tipados. El data source de un bloque referencia `table`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{DataSpec, ModalSpec, NavItem, PageSpec, SecuritySpec, Theme};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoV2 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// Data source V2: vinculado por nombre de tabla (snake_case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDataSource {
    pub table: String,
    #[serde(default)]
    pub filters: Option<Vec<Value>>,
    #[serde(rename = "orderBy", default)]
    pub order_by: Option<Vec<Value>>,
    #[serde(default)]
    pub include: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiV2 {
    pub navigation: Vec<NavItem>,
    pub pages: Vec<PageSpec<TableDataSource>>,
    #[serde(default)]
    pub modals: Option<Vec<ModalSpec<TableDataSource>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintV2 {
    pub version: i64,
    pub app: AppInfoV2,
    pub data: DataSpec,
    pub security: SecuritySpec,
    pub ui: UiV2,
}
