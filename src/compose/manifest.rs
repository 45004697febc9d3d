//! Manifest data model
//!
//! The serde shape of the generated compose file. Maps are `BTreeMap`s
//! so serialization order is deterministic and recompiling an unchanged
//! configuration yields byte-identical YAML.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Compose file format version the docker engine accepts for stacks
pub const COMPOSE_VERSION: &str = "3.3";

/// Network driver of a compiler-defined network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    Overlay,
    Bridge,
}

/// One network definition (or reference) in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<NetworkDriver>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
}

impl Network {
    /// A network the manifest defines itself
    pub fn with_driver(driver: NetworkDriver) -> Self {
        Self {
            driver: Some(driver),
            external: None,
        }
    }

    /// A reference to an externally managed network
    pub fn external() -> Self {
        Self {
            driver: None,
            external: Some(true),
        }
    }
}

/// Memory-lock limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemLock {
    pub soft: i64,
    pub hard: i64,
}

/// Resource limits on a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ulimits {
    pub memlock: MemLock,
}

impl Ulimits {
    /// Unlimited memory locking (Elasticsearch refuses to start under
    /// the default limits)
    pub fn unlimited_memlock() -> Self {
        Self {
            memlock: MemLock { soft: -1, hard: -1 },
        }
    }
}

/// Swarm deploy directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployDirective {
    pub replicas: u32,
}

/// One service definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulimits: Option<Ulimits>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployDirective>,
}

/// A complete compiled manifest: networks plus services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub networks: BTreeMap<String, Network>,
    pub services: BTreeMap<String, Service>,
}

impl Manifest {
    /// Creates an empty manifest holding the single logical network
    pub fn new(network_name: &str, network: Network) -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(network_name.to_string(), network);

        Self {
            version: COMPOSE_VERSION.to_string(),
            networks,
            services: BTreeMap::new(),
        }
    }

    /// Adds a service under the given name
    pub fn add_service(&mut self, name: impl Into<String>, service: Service) {
        self.services.insert(name.into(), service);
    }

    /// Serializes to the YAML the docker engine consumes
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize manifest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_serialization() {
        let overlay = serde_yaml::to_string(&Network::with_driver(NetworkDriver::Overlay)).unwrap();
        assert!(overlay.contains("driver: overlay"));
        assert!(!overlay.contains("external"));

        let external = serde_yaml::to_string(&Network::external()).unwrap();
        assert!(external.contains("external: true"));
        assert!(!external.contains("driver"));
    }

    #[test]
    fn empty_service_fields_are_omitted() {
        let service = Service {
            image: "redis:7.2.1".to_string(),
            networks: vec!["erxes".to_string()],
            ..Default::default()
        };

        let yaml = serde_yaml::to_string(&service).unwrap();
        assert!(yaml.contains("image: redis:7.2.1"));
        assert!(!yaml.contains("ports"));
        assert!(!yaml.contains("environment"));
        assert!(!yaml.contains("deploy"));
    }

    #[test]
    fn memlock_serialization() {
        let yaml = serde_yaml::to_string(&Ulimits::unlimited_memlock()).unwrap();
        assert!(yaml.contains("soft: -1"));
        assert!(yaml.contains("hard: -1"));
    }

    #[test]
    fn manifest_shape() {
        let mut manifest = Manifest::new("erxes", Network::with_driver(NetworkDriver::Bridge));
        manifest.add_service(
            "redis",
            Service {
                image: "redis:7.2.1".to_string(),
                ..Default::default()
            },
        );

        let yaml = manifest.to_yaml().unwrap();
        assert!(yaml.contains("version: '3.3'"));
        assert!(yaml.contains("networks:"));
        assert!(yaml.contains("  erxes:"));
        assert!(yaml.contains("services:"));
        assert!(yaml.contains("  redis:"));
    }
}
