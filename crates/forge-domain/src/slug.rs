//! Normalización de slugs y patrones de identificadores por versión.

use once_cell::sync::Lazy;
use regex::Regex;

/// Slug público de una App: `^[a-z][a-z0-9-]{0,30}$`.
pub static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]{0,30}$").expect("slug regex"));

/// Identificadores snake_case (tablas y columnas V1/V2).
pub static SNAKE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,30}$").expect("snake regex"));

/// Entidades PascalCase (V3).
pub static PASCAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]{0,30}$").expect("pascal regex"));

/// Campos camelCase (V3).
pub static CAMEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]{0,30}$").expect("camel regex"));

const MAX_SLUG_LEN: usize = 30;

/// Normaliza un nombre libre al patrón de slug: minúsculas, sólo `[a-z0-9-]`,
/// separadores colapsados, truncado y con fallback `"app"` si queda vacío.
pub fn normalize_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_dash = true; // suprime guiones al inicio
    for c in lowered.chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            ' ' | '_' | '-' | '\t' => Some('-'),
            _ => None,
        };
        if let Some(m) = mapped {
            if m == '-' {
                if !last_dash {
                    out.push('-');
                    last_dash = true;
                }
            } else {
                out.push(m);
                last_dash = false;
            }
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out.truncate(MAX_SLUG_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    // Un slug debe arrancar con letra; si quedó vacío o numérico, fallback.
    if out.is_empty() || !out.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return "app".to_string();
    }
    out
}
