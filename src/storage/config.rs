//! Deployment configuration handling
//!
//! The configuration lives in `configs.json` inside the deployment
//! directory. It is read in full at the start of every operation and,
//! for mutating operations, rewritten in full at the end. Saves carry a
//! revision check so two operators editing the same file get a conflict
//! instead of silently overwriting each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing domain in configs.json")]
    MissingDomain,

    #[error("Duplicate plugin entry: {0}")]
    DuplicatePlugin(String),

    #[error("Datastore '{0}' is not configured in configs.json")]
    MissingDatastore(&'static str),

    #[error("configs.json changed on disk since it was loaded")]
    RevisionConflict,

    #[error("Failed to parse configs.json: {0}")]
    Parse(String),
}

/// MongoDB credentials and options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub username: String,
    pub password: String,

    /// Default database name (falls back to "erxes")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,

    /// Replica-set mode. Keyfile wiring is not generated yet; the flag
    /// is carried so existing documents round-trip.
    #[serde(default)]
    pub replication: bool,
}

/// Redis credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub password: String,
}

/// RabbitMQ credentials and options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RabbitmqConfig {
    pub user: String,
    pub pass: String,
    pub vhost: String,
    pub cookie: String,

    /// Message broker queue prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Dedicated broker host, overriding `db_server_address` for the
    /// AMQP URL only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
}

/// Elasticsearch section. Presence alone opts the service in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElasticsearchConfig {}

/// Kibana section. Presence alone opts the service in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KibanaConfig {}

/// Widgets frontend options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// One installed feature plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRef {
    pub name: String,

    /// Database name override for this plugin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,

    /// Full mongo URL override, bypassing address resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongo_url: Option<String>,

    /// Image tag override (falls back to the configuration tag)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,

    /// Image registry prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Replica count, honored under swarm mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,

    /// Listening port override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Extra environment, applied last so it wins on collision
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_env: BTreeMap<String, String>,

    /// Database address override for this plugin's `mongo` extra host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_server_address: Option<String>,

    /// Fields this tool does not interpret (kept across rewrites)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PluginRef {
    /// Creates a bare plugin entry with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_name: None,
            mongo_url: None,
            image_tag: None,
            registry: None,
            replicas: None,
            port: None,
            extra_env: BTreeMap::new(),
            db_server_address: None,
            extra: BTreeMap::new(),
        }
    }
}

/// The persisted deployment configuration (`configs.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Public hostname of the deployment
    #[serde(default)]
    pub domain: String,

    /// Release channel selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,

    /// Version marker surfaced as VERSION (defaults to "os")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Installed feature plugins, in install order
    #[serde(default)]
    pub plugins: Vec<PluginRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongo: Option<MongoConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rabbitmq: Option<RabbitmqConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<ElasticsearchConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kibana: Option<KibanaConfig>,

    /// Externally hosted datastore address. When set, every datastore
    /// resolves to this address and its externally published port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_server_address: Option<String>,

    /// Secondary database address, mapped as the `mongo-secondary`
    /// extra host on plugin services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_db_server_address: Option<String>,

    /// Passthrough environment merged into every plugin service
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub be_env: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub widgets: Option<WidgetsConfig>,

    /// DEBUG filter for plugin services (defaults to "*error*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_apm_host_name: Option<String>,

    #[serde(rename = "nodeInspector", skip_serializing_if = "Option::is_none")]
    pub node_inspector: Option<bool>,

    /// Fields this tool does not interpret (installer secrets and the
    /// like), kept across rewrites
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Configuration {
    /// Checks the invariants every operation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::MissingDomain);
        }

        let mut seen = std::collections::HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.name.as_str()) {
                return Err(ConfigError::DuplicatePlugin(plugin.name.clone()));
            }
        }

        Ok(())
    }

    /// Returns the widgets domain, defaulting to `{domain}/widgets`
    pub fn widgets_domain(&self) -> String {
        self.widgets
            .as_ref()
            .and_then(|w| w.domain.clone())
            .unwrap_or_else(|| format!("{}/widgets", self.domain))
    }

    /// Looks up an installed plugin by name
    pub fn plugin(&self, name: &str) -> Option<&PluginRef> {
        self.plugins.iter().find(|p| p.name == name)
    }
}

/// Content revision of the persisted configuration file
///
/// Computed over the raw bytes on load; [`ConfigStore::save`] compares
/// it against the file before writing so a concurrent rewrite surfaces
/// as [`ConfigError::RevisionConflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

/// Load/save access to `configs.json`
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole configuration document and its revision
    pub fn load(&self) -> Result<(Configuration, Revision)> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let config: Configuration = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        Ok((config, Revision::of(&bytes)))
    }

    /// Writes the whole configuration document back
    ///
    /// When `expected` is given and the file no longer matches it, the
    /// save fails with [`ConfigError::RevisionConflict`] and the file is
    /// left untouched.
    pub fn save(&self, config: &Configuration, expected: Option<&Revision>) -> Result<Revision> {
        if let Some(expected) = expected {
            let current = fs::read(&self.path)
                .with_context(|| format!("Failed to read {}", self.path.display()))?;

            if &Revision::of(&current) != expected {
                return Err(ConfigError::RevisionConflict.into());
            }
        }

        let mut content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        content.push('\n');

        fs::write(&self.path, &content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(Revision::of(content.as_bytes()))
    }
}
