//! erxes CLI - deployment tooling for the erxes business suite
//!
//! The core is a compiler from the persisted deployment configuration
//! (`configs.json`) to docker-compose/swarm manifests, plus idempotent
//! plugin lifecycle and asset synchronization routines. Applying the
//! manifests is delegated to the docker engine.

pub mod cli;
pub mod compose;
pub mod plugin;
pub mod runtime;
pub mod storage;

pub use compose::{BackendMode, Manifest, PortSettings};
pub use storage::{Configuration, PluginRef};
