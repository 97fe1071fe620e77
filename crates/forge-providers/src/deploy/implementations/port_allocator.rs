//! Asignador de puertos para backends generados.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use uuid::Uuid;

use forge_core::provision::DeployError;

pub const PORT_RANGE_START: u16 = 4001;
pub const PORT_RANGE_END: u16 = 4999;

/// Registro process-wide de puertos reclamados. El slot preferido sale del
/// hash del app id (asignaciones estables entre ejecuciones); la
/// disponibilidad real se decide contra `live` + este registro.
pub struct PortAllocator {
    start: u16,
    end: u16,
    claimed: DashMap<u16, Uuid>,
}

impl Default for PortAllocator {
    fn default() -> Self {
        PortAllocator::new(PORT_RANGE_START, PORT_RANGE_END)
    }
}

impl PortAllocator {
    pub fn new(start: u16, end: u16) -> Self {
        assert!(start < end, "empty port range");
        PortAllocator { start, end, claimed: DashMap::new() }
    }

    fn span(&self) -> u16 {
        self.end - self.start + 1
    }

    /// Slot determinista para un app id (mismo id, mismo slot preferido).
    pub fn preferred_slot(&self, app_id: Uuid) -> u16 {
        let digest = Sha256::digest(app_id.as_bytes());
        let word = u16::from_be_bytes([digest[0], digest[1]]);
        self.start + word % self.span()
    }

    /// Reclama un puerto libre sondeando hacia adelante (con wrap) desde el
    /// slot preferido. `live` son los puertos observados ocupados en el
    /// escaneo externo del caller.
    pub fn allocate(&self, app_id: Uuid, live: &HashSet<u16>) -> Result<u16, DeployError> {
        let preferred = self.preferred_slot(app_id);
        for offset in 0..self.span() {
            let candidate = self.start + (preferred - self.start + offset) % self.span();
            if live.contains(&candidate) {
                continue;
            }
            // entry() atómico: dos generaciones concurrentes no comparten puerto
            let mut taken = true;
            self.claimed.entry(candidate).or_insert_with(|| {
                taken = false;
                app_id
            });
            if !taken {
                return Ok(candidate);
            }
        }
        Err(DeployError::PortsExhausted)
    }

    /// Libera los puertos reclamados por una app.
    pub fn release(&self, app_id: Uuid) {
        self.claimed.retain(|_, owner| *owner != app_id);
    }
}
