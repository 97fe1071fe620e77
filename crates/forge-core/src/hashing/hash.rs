//! Hash helpers. SHA-256 hex sobre JSON canónico: el digest es la dirección
//! de contenido de un snapshot de Blueprint.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::canonical_json::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest de contenido de un documento Blueprint (JSON arbitrario).
pub fn hash_blueprint(document: &Value) -> String {
    hash_str(&to_canonical_json(document))
}
