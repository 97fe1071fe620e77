//! Validador de Blueprints: fase estructural + fase semántica.
//!
//! La fase estructural deserializa el documento contra el shape de la versión
//! declarada y aborta al primer fallo (sin shape confiable no hay
//! cross-references que revisar). La fase semántica acumula TODOS los
//! hallazgos en una lista ordenada de strings, pensada para incrustarse tal
//! cual en el prompt de reparación. Función pura: sin I/O ni efectos.

use serde_json::Value;
use std::collections::HashSet;

use forge_domain::blueprint::v3::SUPPORTED_GENERATORS;
use forge_domain::blueprint::{Blueprint, BlueprintVersion};
use forge_domain::slug::{CAMEL_PATTERN, PASCAL_PATTERN, SLUG_PATTERN, SNAKE_PATTERN};

use crate::graph::table_creation_order;

/// Resultado de una validación completa.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub parsed: Option<Blueprint>,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn structural_failure(error: String) -> Self {
        ValidationOutcome { ok: false, parsed: None, errors: vec![error] }
    }
}

/// Valida `document` contra la versión declarada.
pub fn validate_blueprint(document: &Value, version: BlueprintVersion) -> ValidationOutcome {
    // Fase 1: estructural. Cualquier campo faltante, tipo primitivo erróneo o
    // enum inválido cae aquí.
    let blueprint = match Blueprint::from_value(document, version) {
        Ok(bp) => bp,
        Err(e) => {
            return ValidationOutcome::structural_failure(format!(
                "blueprint -> version {version}: {e}"
            ));
        }
    };

    // Fase 2: semántica, acumulando todos los hallazgos.
    let mut errors = Vec::new();
    check_identifiers(&blueprint, &mut errors);
    check_relationships(&blueprint, &mut errors);
    check_ui(&blueprint, &mut errors);
    check_permissions(&blueprint, &mut errors);
    check_backend(&blueprint, &mut errors);
    check_cycles(&blueprint, &mut errors);

    let ok = errors.is_empty();
    ValidationOutcome { ok, parsed: Some(blueprint), errors }
}

fn declared_tables(blueprint: &Blueprint) -> HashSet<&str> {
    blueprint.tables().iter().map(|t| t.name.as_str()).collect()
}

/// Convenciones de identificadores según la versión: snake_case en V1/V2,
/// PascalCase/camelCase en V3. El slug comparte patrón en todas.
fn check_identifiers(blueprint: &Blueprint, errors: &mut Vec<String>) {
    let slug = blueprint.app_slug();
    if !SLUG_PATTERN.is_match(slug) {
        errors.push(format!(
            "app -> slug: App slug '{slug}' must be lowercase with hyphens only"
        ));
    }

    let (table_re, table_msg, column_re, column_msg) = match blueprint.version() {
        BlueprintVersion::V1 | BlueprintVersion::V2 => (
            &*SNAKE_PATTERN,
            "snake_case (lowercase, underscores)",
            &*SNAKE_PATTERN,
            "snake_case",
        ),
        BlueprintVersion::V3 => (
            &*PASCAL_PATTERN,
            "PascalCase",
            &*CAMEL_PATTERN,
            "camelCase",
        ),
    };

    for table in blueprint.tables() {
        if !table_re.is_match(&table.name) {
            errors.push(format!(
                "data -> tables: Table name '{}' must be {table_msg}",
                table.name
            ));
        }
        for col in &table.columns {
            if !column_re.is_match(&col.name) {
                errors.push(format!(
                    "data -> tables: Column name '{}' in table '{}' must be {column_msg}",
                    col.name, table.name
                ));
            }
        }
    }

    // V3 también exige camelCase en los nombres de relación (de ellos se
    // deriva la columna propietaria).
    if let Blueprint::V3(bp) = blueprint {
        for rel in &bp.data.relationships {
            if !CAMEL_PATTERN.is_match(&rel.name) {
                errors.push(format!(
                    "data -> relationships: Relationship name '{}' must be camelCase",
                    rel.name
                ));
            }
        }
    }
}

/// Integridad referencial de relaciones: ambos extremos declarados.
fn check_relationships(blueprint: &Blueprint, errors: &mut Vec<String>) {
    let tables = declared_tables(blueprint);
    let endpoints: Vec<(&str, &str)> = match blueprint {
        Blueprint::V1(bp) => bp
            .data
            .relationships
            .iter()
            .map(|r| (r.from_table.as_str(), r.to_table.as_str()))
            .collect(),
        Blueprint::V2(bp) => bp
            .data
            .relationships
            .iter()
            .map(|r| (r.from_table.as_str(), r.to_table.as_str()))
            .collect(),
        Blueprint::V3(bp) => bp
            .data
            .relationships
            .iter()
            .map(|r| (r.from_table.as_str(), r.to_table.as_str()))
            .collect(),
    };

    for (from, to) in endpoints {
        if !tables.contains(from) {
            errors.push(format!(
                "data -> relationships: Relationship references non-existent table '{from}'"
            ));
        }
        if !tables.contains(to) {
            errors.push(format!(
                "data -> relationships: Relationship references non-existent table '{to}'"
            ));
        }
    }
}

/// Integridad referencial de la UI: cada data source apunta a una entidad
/// declarada. En V1 son los recursos CRUD quienes referencian tablas.
fn check_ui(blueprint: &Blueprint, errors: &mut Vec<String>) {
    let tables = declared_tables(blueprint);
    match blueprint {
        Blueprint::V1(bp) => {
            for resource in &bp.ui.resources {
                if !tables.contains(resource.table.as_str()) {
                    errors.push(format!(
                        "ui -> resources: Resource '{}' references non-existent table '{}'",
                        resource.name, resource.table
                    ));
                }
            }
        }
        Blueprint::V2(bp) => {
            for page in &bp.ui.pages {
                for block in &page.blocks {
                    if let Some(ds) = &block.data_source {
                        if !tables.contains(ds.table.as_str()) {
                            errors.push(format!(
                                "ui -> pages: Block '{}' in page '{}' references non-existent table '{}'",
                                block.id, page.id, ds.table
                            ));
                        }
                    }
                }
            }
        }
        Blueprint::V3(bp) => {
            for page in &bp.ui.pages {
                for block in &page.blocks {
                    if let Some(ds) = &block.data_source {
                        if !tables.contains(ds.entity.as_str()) {
                            errors.push(format!(
                                "ui -> pages: Block '{}' in page '{}' references non-existent entity '{}'",
                                block.id, page.id, ds.entity
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Cada permiso debe nombrar un rol declarado y una entidad declarada.
fn check_permissions(blueprint: &Blueprint, errors: &mut Vec<String>) {
    let tables = declared_tables(blueprint);
    match blueprint {
        Blueprint::V1(bp) => check_flat_permissions(&bp.security, &tables, errors),
        Blueprint::V2(bp) => check_flat_permissions(&bp.security, &tables, errors),
        Blueprint::V3(bp) => {
            let roles: HashSet<&str> =
                bp.security.roles.iter().map(|r| r.name.as_str()).collect();
            for perm in &bp.security.permissions {
                if !roles.contains(perm.role.as_str()) {
                    errors.push(format!(
                        "security -> permissions: Permission references non-existent role '{}'",
                        perm.role
                    ));
                }
                if !tables.contains(perm.entity.as_str()) {
                    errors.push(format!(
                        "security -> permissions: Permission references non-existent entity '{}'",
                        perm.entity
                    ));
                }
            }
        }
    }
}

fn check_flat_permissions(
    security: &forge_domain::blueprint::common::SecuritySpec,
    tables: &HashSet<&str>,
    errors: &mut Vec<String>,
) {
    let roles: HashSet<&str> = security.roles.iter().map(String::as_str).collect();
    for perm in &security.permissions {
        if !roles.contains(perm.role.as_str()) {
            errors.push(format!(
                "security -> permissions: Permission references non-existent role '{}'",
                perm.role
            ));
        }
        if !tables.contains(perm.resource.as_str()) {
            errors.push(format!(
                "security -> permissions: Permission references non-existent table '{}'",
                perm.resource
            ));
        }
    }
    for filter in &security.row_filters {
        if !roles.contains(filter.role.as_str()) {
            errors.push(format!(
                "security -> rowFilters: Row filter references non-existent role '{}'",
                filter.role
            ));
        }
        if !tables.contains(filter.resource.as_str()) {
            errors.push(format!(
                "security -> rowFilters: Row filter references non-existent table '{}'",
                filter.resource
            ));
        }
    }
}

/// V3 declara el generador de backend; debe ser un valor soportado.
fn check_backend(blueprint: &Blueprint, errors: &mut Vec<String>) {
    if let Blueprint::V3(bp) = blueprint {
        if !SUPPORTED_GENERATORS.contains(&bp.backend.generator.as_str()) {
            errors.push(format!(
                "backend -> generator: Backend generator '{}' is not supported",
                bp.backend.generator
            ));
        }
    }
}

/// Un ciclo de dependencias pasa el resto de chequeos pero es físicamente
/// irrealizable: se reporta aquí para no gastar presupuesto de reparación en
/// un documento que el aprovisionador rechazaría de todas formas.
fn check_cycles(blueprint: &Blueprint, errors: &mut Vec<String>) {
    if let Err(e) = table_creation_order(blueprint) {
        errors.push(format!("data -> relationships: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_v3(entity: &str) -> Value {
        json!({
            "version": 3,
            "app": { "name": "T", "slug": "t" },
            "backend": { "generator": "amplication" },
            "data": {
                "tables": [
                    { "name": entity, "columns": [
                        { "name": "title", "type": "text", "required": true },
                        { "name": "done", "type": "bool" }
                    ]}
                ],
                "relationships": []
            },
            "security": { "roles": [{ "name": "Admin" }], "permissions": [] },
            "ui": { "navigation": [], "pages": [] }
        })
    }

    #[test]
    fn v3_valido_no_reporta_errores() {
        let out = validate_blueprint(&minimal_v3("Task"), BlueprintVersion::V3);
        assert!(out.ok, "errores: {:?}", out.errors);
        assert!(out.parsed.is_some());
        assert!(out.errors.is_empty());
    }

    #[test]
    fn entidad_minuscula_reporta_exactamente_un_error() {
        let out = validate_blueprint(&minimal_v3("task"), BlueprintVersion::V3);
        assert!(!out.ok);
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].contains("'task'"));
        assert!(out.errors[0].contains("PascalCase"));
        // El parseo estructural sí funcionó: el documento queda disponible.
        assert!(out.parsed.is_some());
    }

    #[test]
    fn estructural_corta_antes_de_semantica() {
        let doc = json!({ "version": 3, "app": { "name": "x" } });
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out.parsed.is_none());
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].starts_with("blueprint -> version 3"));
    }

    #[test]
    fn relacion_colgante_nombra_tabla_faltante() {
        let mut doc = minimal_v3("Task");
        doc["data"]["relationships"] = json!([
            { "name": "project", "type": "many_to_one", "fromTable": "Task", "toTable": "Project" }
        ]);
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out
            .errors
            .iter()
            .any(|e| e.contains("non-existent table 'Project'")));
    }

    #[test]
    fn rol_no_declarado_en_permiso() {
        let mut doc = minimal_v3("Task");
        doc["security"]["permissions"] = json!([
            { "role": "Editor", "entity": "Task",
              "actions": { "create": true, "read": true, "update": false, "delete": false } }
        ]);
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out
            .errors
            .iter()
            .any(|e| e.contains("non-existent role 'Editor'")));
    }

    #[test]
    fn data_source_colgante_en_bloque() {
        let mut doc = minimal_v3("Task");
        doc["ui"]["pages"] = json!([{
            "id": "p1", "blocks": [
                { "id": "b1", "type": "TABLE", "dataSource": { "entity": "Ghost" } }
            ]
        }]);
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out.errors.iter().any(|e| e.contains("Block 'b1'")
            && e.contains("non-existent entity 'Ghost'")));
    }

    #[test]
    fn generador_no_soportado() {
        let mut doc = minimal_v3("Task");
        doc["backend"]["generator"] = json!("handlebars");
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out.errors.iter().any(|e| e.contains("'handlebars'")));
    }

    #[test]
    fn ciclo_de_dependencias_se_detecta_en_validacion() {
        let mut doc = minimal_v3("Task");
        doc["data"]["tables"] = json!([
            { "name": "Alpha", "columns": [ { "name": "label", "type": "text" } ] },
            { "name": "Beta", "columns": [ { "name": "label", "type": "text" } ] }
        ]);
        doc["data"]["relationships"] = json!([
            { "name": "beta", "type": "many_to_one", "fromTable": "Alpha", "toTable": "Beta" },
            { "name": "alpha", "type": "many_to_one", "fromTable": "Beta", "toTable": "Alpha" }
        ]);
        let out = validate_blueprint(&doc, BlueprintVersion::V3);
        assert!(!out.ok);
        assert!(out
            .errors
            .iter()
            .any(|e| e.contains("circular dependency")));
    }

    #[test]
    fn v1_valida_recursos_contra_tablas_declaradas() {
        let doc = json!({
            "version": 1,
            "app": { "name": "Libros", "slug": "libros" },
            "data": {
                "tables": [
                    { "name": "book", "columns": [ { "name": "title", "type": "text" } ] }
                ]
            },
            "security": { "roles": ["Admin"], "permissions": [
                { "role": "Admin", "resource": "book",
                  "actions": { "list": true, "read": true, "create": true, "update": true, "delete": true } }
            ]},
            "ui": {
                "navigation": [{ "name": "books", "label": "Books" }],
                "resources": [
                    { "name": "books", "table": "book", "label": "Books" },
                    { "name": "authors", "table": "author", "label": "Authors" }
                ]
            }
        });
        let out = validate_blueprint(&doc, BlueprintVersion::V1);
        assert!(!out.ok);
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].contains("Resource 'authors'"));
        assert!(out.errors[0].contains("non-existent table 'author'"));
    }

    #[test]
    fn v2_acumula_varios_errores_en_una_pasada() {
        let doc = json!({
            "version": 2,
            "app": { "name": "X", "slug": "Bad Slug" },
            "data": {
                "tables": [
                    { "name": "Items", "columns": [ { "name": "Name", "type": "text" } ] }
                ],
                "relationships": [
                    { "type": "many_to_one", "fromTable": "items", "fromColumn": "owner_id",
                      "toTable": "owners", "toColumn": "id" }
                ]
            },
            "security": { "roles": ["Admin"], "permissions": [
                { "role": "Editor", "resource": "items", "actions": { "read": true } }
            ]},
            "ui": { "navigation": [], "pages": [] }
        });
        let out = validate_blueprint(&doc, BlueprintVersion::V2);
        assert!(!out.ok);
        // slug, tabla, columna, dos extremos colgantes, rol y recurso: todo junto.
        assert!(out.errors.len() >= 6, "se esperaban varios: {:?}", out.errors);
    }
}
