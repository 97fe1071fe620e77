//! Deployer de backends generados.
//!
//! El renderizado del árbol de código del servicio queda fuera de alcance:
//! este módulo materializa la metadata del backend (derivada del Blueprint
//! validado) y administra el recurso compartido que sí importa al plano de
//! control: el puerto de red.
//!
//! Asignación de puertos: se prefiere el slot derivado del hash del app id,
//! pero la decisión final consulta estado vivo (metadata de apps ya
//! generadas) más un registro process-wide, nunca un contador almacenado —
//! otros procesos también pueden ocupar puertos.

pub mod implementations;

pub use implementations::local_deployer::LocalBackendDeployer;
pub use implementations::mock_deployer::MockDeployer;
pub use implementations::port_allocator::PortAllocator;
