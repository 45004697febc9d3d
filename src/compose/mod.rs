//! # Deployment compiler
//!
//! Turns the persisted configuration into docker-compose/swarm
//! manifests.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `settings` | Backend mode and port settings resolved by the driver |
//! | `endpoint` | Datastore address/port resolution and connection URLs |
//! | `env` | Per-service environment assembly |
//! | `manifest` | Manifest data model (YAML shape) |
//! | `compiler` | Datastore-stack and application-stack compilation |
//!
//! Compilation is pure: the same configuration, backend mode, and
//! settings always produce byte-identical YAML, so the apply step can
//! treat an unchanged manifest as a no-op.

mod compiler;
mod endpoint;
mod env;
mod manifest;
mod settings;

pub use compiler::{compile_app_stack, compile_db_stack};
pub use endpoint::{
    elasticsearch_url, load_balancer_address, mongo_url, network_spec, rabbitmq_url, resolve,
    Datastore, Endpoint,
};
pub use env::{common_envs, plugin_environment};
pub use manifest::{DeployDirective, Manifest, MemLock, Network, NetworkDriver, Service, Ulimits};
pub use settings::{BackendMode, PortSettings};

/// Logical network every service attaches to
pub const NETWORK_NAME: &str = "erxes";

/// Stack name of the application services
pub const APP_STACK: &str = "erxes";

/// Stack name of the datastore services
pub const DB_STACK: &str = "erxes-dbs";
