//! Aprovisionador de schemas: compila un Blueprint validado a DDL físico.
//!
//! El plan se construye puro (testeable sin base) y se ejecuta en dos fases:
//! - Fase estructural (schema + tablas + índices) dentro de UNA transacción;
//!   cualquier fallo aborta todo. Un ciclo de dependencias también: un schema
//!   parcial no es un desenlace aceptable de un ciclo.
//! - Fase best-effort (claves foráneas y RLS) fuera de la transacción,
//!   sentencia por sentencia: un FK que no se puede establecer se loggea y NO
//!   aborta — el schema estructural importa más que la integridad referencial
//!   impuesta por la base, que puede parchearse después.

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use sqlx::PgPool;

use forge_core::graph::table_creation_order;
use forge_core::provision::{ProvisionError, SchemaProvisioner};
use forge_domain::blueprint::common::{ColumnSpec, TableSpec};
use forge_domain::{Blueprint, BlueprintVersion, ForeignKeyEdge};

/// Única defensa de inyección para identificadores interpolados en DDL:
/// rechazar (no escapar) todo lo que salga de `[A-Za-z0-9_]`.
fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Columnas de sistema antepuestas a las declaradas; el spelling sigue la
/// convención de la versión.
fn system_columns(version: BlueprintVersion) -> [&'static str; 4] {
    match version {
        BlueprintVersion::V1 | BlueprintVersion::V2 => [
            "id UUID PRIMARY KEY DEFAULT gen_random_uuid()",
            "created_at TIMESTAMPTZ DEFAULT now()",
            "updated_at TIMESTAMPTZ DEFAULT now()",
            "created_by UUID",
        ],
        BlueprintVersion::V3 => [
            "\"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid()",
            "\"createdAt\" TIMESTAMPTZ DEFAULT now()",
            "\"updatedAt\" TIMESTAMPTZ DEFAULT now()",
            "\"createdBy\" UUID",
        ],
    }
}

/// DEFAULT tipado: strings citados (con escape de comillas), bool/número como
/// literal — así no hay mismatch de tipos en el DDL emitido.
fn default_to_sql(default: &Value) -> String {
    match default {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

fn column_to_sql(col: &ColumnSpec) -> String {
    let mut parts = vec![format!("\"{}\"", col.name), col.column_type.pg_type().to_string()];
    if col.required {
        parts.push("NOT NULL".to_string());
    }
    if col.unique {
        parts.push("UNIQUE".to_string());
    }
    if let Some(default) = &col.default {
        parts.push(format!("DEFAULT {}", default_to_sql(default)));
    }
    parts.join(" ")
}

fn create_table_sql(
    schema_name: &str,
    table: &TableSpec,
    version: BlueprintVersion,
    implicit_fk_columns: &[String],
) -> String {
    let mut columns: Vec<String> =
        system_columns(version).iter().map(|s| s.to_string()).collect();
    for col in &table.columns {
        columns.push(column_to_sql(col));
    }
    for fk_col in implicit_fk_columns {
        columns.push(format!("\"{fk_col}\" UUID"));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS \"{schema_name}\".\"{}\" (\n   {}\n)",
        table.name,
        columns.join(",\n   ")
    )
}

/// Plan completo de aprovisionamiento, separado por política de fallo.
#[derive(Debug)]
pub struct SchemaPlan {
    /// Fase fatal: schema, tablas (en orden de dependencias) e índices.
    pub structural: Vec<String>,
    /// Segunda pasada best-effort: constraints FK.
    pub foreign_keys: Vec<String>,
    /// Base default-locked-down: RLS habilitado sin policies.
    pub row_level_security: Vec<String>,
}

/// Compila el Blueprint a un `SchemaPlan`. Función pura.
pub fn plan_schema(schema_name: &str, blueprint: &Blueprint) -> Result<SchemaPlan, ProvisionError> {
    if !is_safe_identifier(schema_name) {
        return Err(ProvisionError::InvalidSchemaName(schema_name.to_string()));
    }

    let order = table_creation_order(blueprint)?;
    let edges = blueprint.many_to_one_edges();
    let version = blueprint.version();

    let mut structural = vec![format!("CREATE SCHEMA IF NOT EXISTS \"{schema_name}\"")];

    for table_name in &order {
        let table = blueprint
            .tables()
            .iter()
            .find(|t| &t.name == table_name)
            .expect("ordered table comes from the blueprint");

        // Columnas FK implícitas (V3): las aristas derivadas cuyo nombre no
        // coincide con ninguna columna declarada.
        let implicit: Vec<String> = edges
            .iter()
            .filter(|e| {
                e.from_table == table.name
                    && !table.columns.iter().any(|c| c.name == e.from_column)
            })
            .map(|e| e.from_column.clone())
            .collect();

        structural.push(create_table_sql(schema_name, table, version, &implicit));

        for col in table.columns.iter().filter(|c| c.indexed) {
            structural.push(format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{}_{}\" ON \"{schema_name}\".\"{}\" (\"{}\")",
                table.name, col.name, table.name, col.name
            ));
        }
    }

    let foreign_keys = edges.iter().map(|e| foreign_key_sql(schema_name, e)).collect();

    let row_level_security = blueprint
        .tables()
        .iter()
        .map(|t| {
            format!(
                "ALTER TABLE \"{schema_name}\".\"{}\" ENABLE ROW LEVEL SECURITY",
                t.name
            )
        })
        .collect();

    Ok(SchemaPlan { structural, foreign_keys, row_level_security })
}

fn foreign_key_sql(schema_name: &str, edge: &ForeignKeyEdge) -> String {
    format!(
        "ALTER TABLE \"{schema_name}\".\"{}\" ADD CONSTRAINT \"fk_{}_{}\" FOREIGN KEY (\"{}\") REFERENCES \"{schema_name}\".\"{}\" (\"{}\")",
        edge.from_table,
        edge.from_table,
        edge.from_column,
        edge.from_column,
        edge.to_table,
        edge.to_column
    )
}

pub struct PgProvisioner {
    pool: PgPool,
}

impl PgProvisioner {
    pub fn new(pool: PgPool) -> Self {
        PgProvisioner { pool }
    }
}

#[async_trait]
impl SchemaProvisioner for PgProvisioner {
    async fn provision(
        &self,
        schema_name: &str,
        blueprint: &Blueprint,
    ) -> Result<(), ProvisionError> {
        info!("provisioning schema {schema_name}");
        let plan = plan_schema(schema_name, blueprint)?;

        // Fase estructural: atómica.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ProvisionError::Ddl(format!("begin: {e}")))?;
        for statement in &plan.structural {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| ProvisionError::Ddl(format!("{statement}: {e}")))?;
        }
        tx.commit()
            .await
            .map_err(|e| ProvisionError::Ddl(format!("commit: {e}")))?;

        // Segunda pasada: FKs y RLS, sentencia a sentencia, nunca fatales.
        for statement in plan.foreign_keys.iter().chain(&plan.row_level_security) {
            if let Err(e) = sqlx::query(statement).execute(&self.pool).await {
                warn!("best-effort ddl failed ({statement}): {e}");
            }
        }

        info!("schema {schema_name} provisioned");
        Ok(())
    }

    async fn drop_schema(&self, schema_name: &str) -> Result<(), ProvisionError> {
        if !is_safe_identifier(schema_name) {
            return Err(ProvisionError::InvalidSchemaName(schema_name.to_string()));
        }
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{schema_name}\" CASCADE"))
            .execute(&self.pool)
            .await
            .map_err(|e| ProvisionError::Ddl(format!("drop {schema_name}: {e}")))?;
        info!("schema {schema_name} dropped");
        Ok(())
    }
}
