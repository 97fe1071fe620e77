//! Pruebas puras del plan de DDL (sin base de datos).

use serde_json::json;

use forge_core::provision::ProvisionError;
use forge_domain::{Blueprint, BlueprintVersion};
use forge_persistence::provision::plan_schema;

fn chain_doc() -> Blueprint {
    // A -> B -> C en many_to_one: C debe crearse primero.
    let doc = json!({
        "version": 3,
        "app": { "name": "Chain", "slug": "chain" },
        "backend": { "generator": "amplication" },
        "data": {
            "tables": [
                { "name": "A", "columns": [ { "name": "label", "type": "text" } ] },
                { "name": "B", "columns": [ { "name": "label", "type": "text" } ] },
                { "name": "C", "columns": [ { "name": "label", "type": "text" } ] }
            ],
            "relationships": [
                { "name": "b", "type": "many_to_one", "fromTable": "A", "toTable": "B" },
                { "name": "c", "type": "many_to_one", "fromTable": "B", "toTable": "C" }
            ]
        },
        "security": { "roles": [{ "name": "Admin" }], "permissions": [] },
        "ui": { "navigation": [], "pages": [] }
    });
    Blueprint::from_value(&doc, BlueprintVersion::V3).unwrap()
}

#[test]
fn las_tablas_se_crean_en_orden_de_dependencias() {
    let plan = plan_schema("app_abc", &chain_doc()).unwrap();
    let creates: Vec<&String> = plan
        .structural
        .iter()
        .filter(|s| s.starts_with("CREATE TABLE"))
        .collect();
    assert_eq!(creates.len(), 3);
    assert!(creates[0].contains("\"C\""));
    assert!(creates[1].contains("\"B\""));
    assert!(creates[2].contains("\"A\""));
    // El schema en sí va antes que cualquier tabla.
    assert!(plan.structural[0].starts_with("CREATE SCHEMA IF NOT EXISTS \"app_abc\""));
}

#[test]
fn cada_tabla_lleva_las_cuatro_columnas_de_sistema_v3() {
    let plan = plan_schema("app_abc", &chain_doc()).unwrap();
    let create = plan
        .structural
        .iter()
        .find(|s| s.contains("\"C\""))
        .unwrap();
    for col in ["\"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid()",
                "\"createdAt\" TIMESTAMPTZ DEFAULT now()",
                "\"updatedAt\" TIMESTAMPTZ DEFAULT now()",
                "\"createdBy\" UUID"] {
        assert!(create.contains(col), "falta {col} en: {create}");
    }
}

#[test]
fn la_arista_v3_materializa_columna_fk_implicita() {
    let plan = plan_schema("app_abc", &chain_doc()).unwrap();
    let create_a = plan
        .structural
        .iter()
        .find(|s| s.starts_with("CREATE TABLE") && s.contains("\"A\""))
        .unwrap();
    assert!(create_a.contains("\"bId\" UUID"), "sin columna implícita: {create_a}");

    assert!(plan.foreign_keys.iter().any(|s| {
        s.contains("\"fk_A_bId\"")
            && s.contains("FOREIGN KEY (\"bId\")")
            && s.contains("REFERENCES \"app_abc\".\"B\" (\"id\")")
    }));
}

#[test]
fn rls_se_habilita_en_todas_las_tablas() {
    let plan = plan_schema("app_abc", &chain_doc()).unwrap();
    assert_eq!(plan.row_level_security.len(), 3);
    assert!(plan
        .row_level_security
        .iter()
        .all(|s| s.ends_with("ENABLE ROW LEVEL SECURITY")));
}

#[test]
fn defaults_tipados_y_escapados() {
    let doc = json!({
        "version": 2,
        "app": { "name": "D", "slug": "d" },
        "data": {
            "tables": [{
                "name": "settings",
                "columns": [
                    { "name": "label", "type": "text", "default": "it's on" },
                    { "name": "active", "type": "bool", "default": true },
                    { "name": "retries", "type": "int", "default": 3 },
                    { "name": "score", "type": "float", "required": true, "unique": true },
                    { "name": "tag", "type": "text", "indexed": true }
                ]
            }],
            "relationships": []
        },
        "security": { "roles": ["Admin"], "permissions": [] },
        "ui": { "navigation": [], "pages": [] }
    });
    let bp = Blueprint::from_value(&doc, BlueprintVersion::V2).unwrap();
    let plan = plan_schema("app_d", &bp).unwrap();
    let create = &plan.structural[1];

    assert!(create.contains("\"label\" TEXT DEFAULT 'it''s on'"));
    assert!(create.contains("\"active\" BOOLEAN DEFAULT true"));
    assert!(create.contains("\"retries\" INTEGER DEFAULT 3"));
    assert!(create.contains("\"score\" DOUBLE PRECISION NOT NULL UNIQUE"));
    // V2 usa spelling snake_case en columnas de sistema.
    assert!(create.contains("created_at TIMESTAMPTZ DEFAULT now()"));
    // La columna indexada genera su índice secundario.
    assert!(plan
        .structural
        .iter()
        .any(|s| s.contains("\"idx_settings_tag\"")));
}

#[test]
fn ciclo_aborta_sin_emitir_nada() {
    let doc = json!({
        "version": 2,
        "app": { "name": "Cyc", "slug": "cyc" },
        "data": {
            "tables": [
                { "name": "a", "columns": [ { "name": "b_id", "type": "uuid" } ] },
                { "name": "b", "columns": [ { "name": "a_id", "type": "uuid" } ] }
            ],
            "relationships": [
                { "type": "many_to_one", "fromTable": "a", "fromColumn": "b_id", "toTable": "b", "toColumn": "id" },
                { "type": "many_to_one", "fromTable": "b", "fromColumn": "a_id", "toTable": "a", "toColumn": "id" }
            ]
        },
        "security": { "roles": ["Admin"], "permissions": [] },
        "ui": { "navigation": [], "pages": [] }
    });
    let bp = Blueprint::from_value(&doc, BlueprintVersion::V2).unwrap();
    let err = plan_schema("app_cyc", &bp).unwrap_err();
    assert!(matches!(err, ProvisionError::Graph(_)));
}

#[test]
fn nombre_de_schema_fuera_del_alfabeto_se_rechaza() {
    for bad in ["app-x", "app x", "app\";drop", ""] {
        let err = plan_schema(bad, &chain_doc()).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidSchemaName(_)), "aceptó '{bad}'");
    }
}
