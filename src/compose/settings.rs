//! Process-wide deployment settings
//!
//! Backend mode and port numbers come from the driver's environment
//! (`DEPLOYMENT_METHOD`, `MONGO_PORT`, ...). The compiler receives them
//! already resolved; nothing in this crate below the CLI reads the
//! environment.

/// Target orchestration model
///
/// Gates only deploy-shape fields (replica directives, network driver),
/// never address resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Multi-node docker swarm (the default)
    Swarm,
    /// Single-node docker compose
    Compose,
}

impl BackendMode {
    /// Maps a `DEPLOYMENT_METHOD` value; anything other than
    /// `docker-compose` selects swarm.
    pub fn from_method(method: &str) -> Self {
        if method == "docker-compose" {
            BackendMode::Compose
        } else {
            BackendMode::Swarm
        }
    }

    pub fn is_swarm(self) -> bool {
        self == BackendMode::Swarm
    }
}

/// Externally published ports and the internal service port
#[derive(Debug, Clone)]
pub struct PortSettings {
    /// Port plugin services listen on inside their containers
    pub service_internal_port: u16,

    /// Published gateway port
    pub gateway_port: u16,

    /// Published frontend port
    pub ui_port: u16,

    /// Published mongo port (also the remote-datastore mongo port)
    pub mongo_port: u16,

    /// Published redis port (also the remote-datastore redis port)
    pub redis_port: u16,

    /// Published rabbitmq port (also the remote-datastore rabbitmq port)
    pub rabbitmq_port: u16,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            service_internal_port: 80,
            gateway_port: 3300,
            ui_port: 3000,
            mongo_port: 27017,
            redis_port: 6379,
            rabbitmq_port: 5672,
        }
    }
}
