//! Subestructuras compartidas entre versiones del Blueprint.
//!
//! Aquí viven únicamente las formas cuyo shape es idéntico en V1/V2/V3
//! (columnas, tablas, navegación, páginas/bloques parametrizados por el tipo
//! de data source). Todo lo que cambia de nombre o de forma entre versiones
//! se declara en su módulo de versión.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tipos primitivos admitidos para columnas declaradas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Uuid,
    Text,
    Int,
    Float,
    Bool,
    Date,
    Timestamptz,
    Jsonb,
}

impl ColumnType {
    /// Tipo físico PostgreSQL correspondiente.
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "UUID",
            ColumnType::Text => "TEXT",
            ColumnType::Int => "INTEGER",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Timestamptz => "TIMESTAMPTZ",
            ColumnType::Jsonb => "JSONB",
        }
    }
}

/// Especificación de una columna declarada por el usuario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub indexed: bool,
}

fn default_primary_key() -> String {
    "id".to_string()
}

/// Especificación de una entidad/tabla. `displayName` sólo lo emite V3 pero
/// el shape es por lo demás idéntico entre versiones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "primaryKey", default = "default_primary_key")]
    pub primary_key: String,
    pub columns: Vec<ColumnSpec>,
}

/// Dirección de una relación entre entidades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
}

/// Relación con columnas explícitas (V1/V2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRelationship {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    #[serde(rename = "fromTable")]
    pub from_table: String,
    #[serde(rename = "fromColumn")]
    pub from_column: String,
    #[serde(rename = "toTable")]
    pub to_table: String,
    #[serde(rename = "toColumn")]
    pub to_column: String,
    #[serde(rename = "lookupLabelColumn", default)]
    pub lookup_label_column: Option<String>,
}

/// Sección `data` de V1/V2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub relationships: Vec<ColumnRelationship>,
}

/// Expresión de filtro por fila (V1/V2), recursiva.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(default)]
    pub equals: Option<Vec<String>>,
    #[serde(rename = "in", default)]
    pub in_values: Option<Vec<String>>,
    #[serde(rename = "and", default)]
    pub all_of: Option<Vec<FilterExpression>>,
    #[serde(rename = "or", default)]
    pub any_of: Option<Vec<FilterExpression>>,
}

/// Regla de filtro por fila asociada a un rol y un recurso (V1/V2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFilterRule {
    pub role: String,
    pub resource: String,
    pub filter: FilterExpression,
}

/// Permiso V1/V2: acciones como mapa abierto (list/read/create/update/delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRule {
    pub role: String,
    pub resource: String,
    pub actions: std::collections::BTreeMap<String, bool>,
}

/// Sección `security` de V1/V2: roles planos como strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySpec {
    pub roles: Vec<String>,
    pub permissions: Vec<PermissionRule>,
    #[serde(rename = "rowFilters", default)]
    pub row_filters: Vec<RowFilterRule>,
}

/// Entrada del árbol de navegación; recursiva vía `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<NavItem>>,
}

/// Tema visual de la aplicación. Se tolera cualquier extra aguas arriba.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(rename = "primaryColor", default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Layout de página (single|split|grid|tabs más configuración libre).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSpec {
    #[serde(rename = "type")]
    pub layout_type: String,
    #[serde(default)]
    pub config: Option<Value>,
}

/// Binding de acción de un bloque: disparador -> efecto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionBinding {
    pub trigger: String,
    pub action: String,
    #[serde(default)]
    pub config: Option<Value>,
}

/// Bloque tipado de UI, parametrizado por el tipo de data source de la
/// versión (V2 referencia `table`, V3 referencia `entity`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
pub struct BlockSpec<D> {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(rename = "dataSource", default)]
    pub data_source: Option<D>,
    #[serde(default)]
    pub props: Option<Value>,
    #[serde(default)]
    pub actions: Option<Vec<ActionBinding>>,
}

/// Página compuesta de bloques.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec<D> {
    pub id: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub layout: Option<LayoutSpec>,
    pub blocks: Vec<BlockSpec<D>>,
}

/// Modal con los mismos bloques que una página.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalSpec<D> {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub blocks: Vec<BlockSpec<D>>,
}
