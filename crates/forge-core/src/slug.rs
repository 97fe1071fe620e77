//! Asignador de slugs únicos.
//!
//! Estrategia graduada: el caso común conserva slugs cortos y legibles
//! (sufijo numérico), y el adversarial termina siempre (sufijo aleatorio y,
//! como último recurso, hora del día).

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use forge_domain::slug::normalize_slug;

use crate::store::{ControlStore, StoreError};

const MAX_SLUG_LEN: usize = 30;
const NUMERIC_ATTEMPTS: u32 = 10;
const MAX_ATTEMPTS: u32 = 20;

/// Recorta la base para que `base + "-" + suffix` respete el largo máximo.
fn with_suffix(base: &str, suffix: &str) -> String {
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len() + 1);
    let mut head: String = base.chars().take(keep).collect();
    while head.ends_with('-') {
        head.pop();
    }
    format!("{head}-{suffix}")
}

/// Garantiza un slug único en el store, excluyendo opcionalmente la propia
/// app (renombres). Candidatos en orden: `base`, `base-1`..`base-10`, luego
/// sufijos aleatorios de 4 caracteres, y a partir de `MAX_ATTEMPTS` un sufijo
/// con la hora del día que no se vuelve a probar.
pub async fn ensure_unique_slug<S: ControlStore + ?Sized>(
    store: &S,
    candidate: &str,
    exclude_app_id: Option<Uuid>,
) -> Result<String, StoreError> {
    let base = normalize_slug(candidate);
    if !store.slug_exists(&base, exclude_app_id).await? {
        return Ok(base);
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let slug = if attempt <= NUMERIC_ATTEMPTS {
            with_suffix(&base, &attempt.to_string())
        } else {
            // 4 hex de un UUID fresco: suficiente para esquivar patrones de
            // colisión sin salir del alfabeto del slug.
            let hex = Uuid::new_v4().simple().to_string();
            with_suffix(&base, &hex[..4])
        };
        if !store.slug_exists(&slug, exclude_app_id).await? {
            return Ok(slug);
        }
    }

    // Terminación garantizada: hora del día, sin probe adicional.
    let fallback = with_suffix(&base, &Utc::now().format("%H%M%S").to_string());
    warn!("slug allocator exhausted {MAX_ATTEMPTS} attempts for '{base}', falling back to '{fallback}'");
    Ok(fallback)
}
