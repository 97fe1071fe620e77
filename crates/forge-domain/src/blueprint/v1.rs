//! Contrato estructural V1: UI declarada como recursos CRUD (sin bloques).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{DataSpec, NavItem, SecuritySpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoV1 {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub widget: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub columns: Vec<String>,
    #[serde(default)]
    pub filters: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(rename = "createFields", default)]
    pub create_fields: Option<Vec<FieldSpec>>,
    #[serde(rename = "editFields", default)]
    pub edit_fields: Option<Vec<FieldSpec>>,
}

fn default_views() -> std::collections::BTreeMap<String, bool> {
    [("list", true), ("create", true), ("edit", true), ("show", true)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Recurso CRUD de la UI V1: vistas generadas sobre una tabla declarada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub table: String,
    pub label: String,
    #[serde(default = "default_views")]
    pub views: std::collections::BTreeMap<String, bool>,
    #[serde(default)]
    pub list: Option<ListConfig>,
    #[serde(default)]
    pub forms: Option<FormConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiV1 {
    pub navigation: Vec<NavItem>,
    pub resources: Vec<ResourceSpec>,
    #[serde(default)]
    pub pages: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintV1 {
    pub version: i64,
    pub app: AppInfoV1,
    pub data: DataSpec,
    pub security: SecuritySpec,
    pub ui: UiV1,
}
