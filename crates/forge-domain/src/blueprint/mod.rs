//! Documento Blueprint: unión etiquetada sobre las versiones de contrato.
//!
//! La versión declarada selecciona qué shape estructural aplica; las
//! versiones NO son intercambiables (convenciones de nombres y secciones
//! distintas). El resto del sistema consume el documento a través de los
//! accesores normalizados de `Blueprint`, de modo que el aprovisionador y el
//! orquestador quedan ciegos a la versión concreta.

pub mod common;
pub mod v1;
pub mod v2;
pub mod v3;

use serde_json::Value;
use std::fmt;

use crate::error::DomainError;
pub use common::{ColumnSpec, ColumnType, RelationKind, TableSpec};
pub use v1::BlueprintV1;
pub use v2::BlueprintV2;
pub use v3::BlueprintV3;

/// Etiqueta de versión del contrato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlueprintVersion {
    V1,
    V2,
    V3,
}

impl BlueprintVersion {
    pub fn as_int(&self) -> i64 {
        match self {
            BlueprintVersion::V1 => 1,
            BlueprintVersion::V2 => 2,
            BlueprintVersion::V3 => 3,
        }
    }
}

impl TryFrom<i64> for BlueprintVersion {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BlueprintVersion::V1),
            2 => Ok(BlueprintVersion::V2),
            3 => Ok(BlueprintVersion::V3),
            other => Err(DomainError::Contract(format!(
                "unsupported blueprint version {other}"
            ))),
        }
    }
}

impl fmt::Display for BlueprintVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

/// Arista de clave foránea normalizada (independiente de la versión).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Unión etiquetada de documentos Blueprint ya tipados.
#[derive(Debug, Clone)]
pub enum Blueprint {
    V1(BlueprintV1),
    V2(BlueprintV2),
    V3(BlueprintV3),
}

impl Blueprint {
    /// Punto único de despacho estructural: deserializa `value` contra el
    /// shape de la versión declarada. Un fallo aquí es un error estructural
    /// (el documento no puede recorrerse con confianza).
    pub fn from_value(value: &Value, version: BlueprintVersion) -> Result<Self, DomainError> {
        let parsed = match version {
            BlueprintVersion::V1 => Blueprint::V1(serde_json::from_value(value.clone())?),
            BlueprintVersion::V2 => Blueprint::V2(serde_json::from_value(value.clone())?),
            BlueprintVersion::V3 => Blueprint::V3(serde_json::from_value(value.clone())?),
        };
        Ok(parsed)
    }

    pub fn version(&self) -> BlueprintVersion {
        match self {
            Blueprint::V1(_) => BlueprintVersion::V1,
            Blueprint::V2(_) => BlueprintVersion::V2,
            Blueprint::V3(_) => BlueprintVersion::V3,
        }
    }

    pub fn app_name(&self) -> &str {
        match self {
            Blueprint::V1(b) => &b.app.name,
            Blueprint::V2(b) => &b.app.name,
            Blueprint::V3(b) => &b.app.name,
        }
    }

    pub fn app_slug(&self) -> &str {
        match self {
            Blueprint::V1(b) => &b.app.slug,
            Blueprint::V2(b) => &b.app.slug,
            Blueprint::V3(b) => &b.app.slug,
        }
    }

    pub fn app_description(&self) -> Option<&str> {
        match self {
            Blueprint::V1(b) => b.app.description.as_deref(),
            Blueprint::V2(b) => b.app.description.as_deref(),
            Blueprint::V3(b) => b.app.description.as_deref(),
        }
    }

    /// Entidades declaradas, en el orden del documento.
    pub fn tables(&self) -> &[TableSpec] {
        match self {
            Blueprint::V1(b) => &b.data.tables,
            Blueprint::V2(b) => &b.data.tables,
            Blueprint::V3(b) => &b.data.tables,
        }
    }

    /// Aristas many_to_one normalizadas. Para V1/V2 las columnas vienen
    /// declaradas; para V3 la columna propietaria se deriva del nombre de la
    /// relación (`<name>Id`) y apunta siempre a la PK subrogada `id`.
    pub fn many_to_one_edges(&self) -> Vec<ForeignKeyEdge> {
        match self {
            Blueprint::V1(b) => column_edges(&b.data.relationships),
            Blueprint::V2(b) => column_edges(&b.data.relationships),
            Blueprint::V3(b) => b
                .data
                .relationships
                .iter()
                .filter(|r| r.kind == RelationKind::ManyToOne)
                .map(|r| ForeignKeyEdge {
                    from_table: r.from_table.clone(),
                    from_column: format!("{}Id", r.name),
                    to_table: r.to_table.clone(),
                    to_column: "id".to_string(),
                })
                .collect(),
        }
    }
}

fn column_edges(relationships: &[common::ColumnRelationship]) -> Vec<ForeignKeyEdge> {
    relationships
        .iter()
        .filter(|r| r.kind == RelationKind::ManyToOne)
        .map(|r| ForeignKeyEdge {
            from_table: r.from_table.clone(),
            from_column: r.from_column.clone(),
            to_table: r.to_table.clone(),
            to_column: r.to_column.clone(),
        })
        .collect()
}
