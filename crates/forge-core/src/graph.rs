//! Grafo de dependencias entre tablas y orden de creación.
//!
//! Una tabla con relación many_to_one depende de su tabla destino: debe
//! crearse después. El orden se obtiene por DFS post-orden; si una tabla es
//! alcanzable desde sí misma por aristas de dependencia, el Blueprint es
//! físicamente irrealizable y se aborta con error de ciclo.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use forge_domain::Blueprint;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("circular dependency detected involving table '{table}'")]
    CircularDependency { table: String },
}

/// Orden de creación para `tables` dadas aristas `(from, to)` donde `from`
/// depende de `to`. Las aristas hacia tablas no declaradas se ignoran (las
/// referencias colgantes son asunto del validador, no del grafo).
pub fn dependency_order(
    tables: &[String],
    edges: &[(String, String)],
) -> Result<Vec<String>, GraphError> {
    let declared: HashSet<&str> = tables.iter().map(String::as_str).collect();
    let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in edges {
        if declared.contains(from.as_str()) && declared.contains(to.as_str()) {
            deps.entry(from.as_str()).or_default().push(to.as_str());
        }
    }

    let mut ordered: Vec<String> = Vec::with_capacity(tables.len());
    let mut visited: HashSet<&str> = HashSet::new();
    let mut in_path: HashSet<&str> = HashSet::new();

    fn visit<'a>(
        name: &'a str,
        deps: &HashMap<&'a str, Vec<&'a str>>,
        visited: &mut HashSet<&'a str>,
        in_path: &mut HashSet<&'a str>,
        ordered: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if in_path.contains(name) {
            return Err(GraphError::CircularDependency { table: name.to_string() });
        }
        if visited.contains(name) {
            return Ok(());
        }
        in_path.insert(name);
        if let Some(targets) = deps.get(name) {
            for dep in targets {
                visit(dep, deps, visited, in_path, ordered)?;
            }
        }
        in_path.remove(name);
        visited.insert(name);
        ordered.push(name.to_string());
        Ok(())
    }

    for table in tables {
        visit(table, &deps, &mut visited, &mut in_path, &mut ordered)?;
    }
    Ok(ordered)
}

/// Conveniencia sobre un Blueprint ya validado.
pub fn table_creation_order(blueprint: &Blueprint) -> Result<Vec<String>, GraphError> {
    let tables: Vec<String> = blueprint.tables().iter().map(|t| t.name.clone()).collect();
    let edges: Vec<(String, String)> = blueprint
        .many_to_one_edges()
        .into_iter()
        .map(|e| (e.from_table, e.to_table))
        .collect();
    dependency_order(&tables, &edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn cadena_a_b_c_se_crea_en_reversa() {
        // A -> B y B -> C: C primero, luego B, luego A.
        let order = dependency_order(
            &s(&["A", "B", "C"]),
            &[("A".into(), "B".into()), ("B".into(), "C".into())],
        )
        .unwrap();
        assert_eq!(order, s(&["C", "B", "A"]));
    }

    #[test]
    fn sin_aristas_conserva_el_orden_declarado() {
        let order = dependency_order(&s(&["x", "y", "z"]), &[]).unwrap();
        assert_eq!(order, s(&["x", "y", "z"]));
    }

    #[test]
    fn ciclo_directo_es_fatal() {
        let err = dependency_order(
            &s(&["A", "B"]),
            &[("A".into(), "B".into()), ("B".into(), "A".into())],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::CircularDependency { .. }));
    }

    #[test]
    fn auto_referencia_es_ciclo() {
        let err =
            dependency_order(&s(&["A"]), &[("A".into(), "A".into())]).unwrap_err();
        assert_eq!(err, GraphError::CircularDependency { table: "A".into() });
    }

    #[test]
    fn aristas_hacia_tablas_desconocidas_se_ignoran() {
        let order = dependency_order(&s(&["A"]), &[("A".into(), "ghost".into())]).unwrap();
        assert_eq!(order, s(&["A"]));
    }
}
