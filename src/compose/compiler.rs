//! Manifest compilation
//!
//! Two entry points: [`compile_db_stack`] for the datastore services
//! and [`compile_app_stack`] for the per-plugin application services.
//! Both are pure functions of configuration, backend mode, and port
//! settings; applying the result is the driver's concern.

use std::collections::BTreeMap;

use crate::storage::{
    ConfigError, Configuration, MongoConfig, PluginRef, RabbitmqConfig, RedisConfig,
};

use super::endpoint::network_spec;
use super::env::plugin_environment;
use super::manifest::{DeployDirective, Manifest, Service, Ulimits};
use super::settings::{BackendMode, PortSettings};
use super::NETWORK_NAME;

/// Image tag used when neither the plugin nor the configuration sets one
const DEFAULT_IMAGE_TAG: &str = "federation";

fn erxes_networks() -> Vec<String> {
    vec![NETWORK_NAME.to_string()]
}

/// Compiles the datastore stack
///
/// Each datastore present in the configuration contributes one service;
/// absent sections are skipped entirely.
pub fn compile_db_stack(
    config: &Configuration,
    mode: BackendMode,
    ports: &PortSettings,
) -> Result<Manifest, ConfigError> {
    config.validate()?;

    let mut manifest = Manifest::new(NETWORK_NAME, network_spec(config, mode));

    if config.kibana.is_some() {
        manifest.add_service("kibana", kibana_service());
    }

    if let Some(mongo) = &config.mongo {
        manifest.add_service("mongo", mongo_service(mongo, ports));
    }

    if config.elasticsearch.is_some() {
        manifest.add_service("elasticsearch", elasticsearch_service());
    }

    if let Some(redis) = &config.redis {
        manifest.add_service("redis", redis_service(redis, ports));
    }

    if let Some(rabbitmq) = &config.rabbitmq {
        manifest.add_service("rabbitmq", rabbitmq_service(rabbitmq, ports));
    }

    Ok(manifest)
}

/// Compiles the application stack: one service per installed plugin
pub fn compile_app_stack(
    config: &Configuration,
    mode: BackendMode,
    ports: &PortSettings,
) -> Result<Manifest, ConfigError> {
    config.validate()?;

    let mut manifest = Manifest::new(NETWORK_NAME, network_spec(config, mode));

    for plugin in &config.plugins {
        manifest.add_service(
            format!("plugin-{}-api", plugin.name),
            plugin_service(config, plugin, mode, ports)?,
        );
    }

    Ok(manifest)
}

/// Builds one plugin service definition
pub fn plugin_service(
    config: &Configuration,
    plugin: &PluginRef,
    mode: BackendMode,
    ports: &PortSettings,
) -> Result<Service, ConfigError> {
    let image_tag = plugin
        .image_tag
        .as_deref()
        .or(config.image_tag.as_deref())
        .unwrap_or(DEFAULT_IMAGE_TAG);
    let registry = plugin
        .registry
        .as_deref()
        .map(|r| format!("{}/", r))
        .unwrap_or_default();

    // Container-local DNS override for database clients that hardcode
    // the hostname `mongo`
    let mut extra_hosts = Vec::new();
    if let Some(address) = plugin
        .db_server_address
        .as_deref()
        .or(config.db_server_address.as_deref())
    {
        extra_hosts.push(format!("mongo:{}", address));
    }
    if let Some(address) = &config.secondary_db_server_address {
        extra_hosts.push(format!("mongo-secondary:{}", address));
    }

    let mut service = Service {
        image: format!(
            "{}erxes/plugin-{}-api:{}",
            registry, plugin.name, image_tag
        ),
        environment: plugin_environment(config, plugin, mode, ports)?,
        networks: erxes_networks(),
        extra_hosts,
        ..Default::default()
    };

    // Compose has no replica concept, so the directive is dropped there
    // even when the plugin requests one
    if mode.is_swarm() {
        if let Some(replicas) = plugin.replicas {
            service.deploy = Some(DeployDirective { replicas });
        }
    }

    Ok(service)
}

fn kibana_service() -> Service {
    Service {
        image: "docker.elastic.co/kibana/kibana:7.6.0".to_string(),
        ports: vec!["5601:5601".to_string()],
        networks: erxes_networks(),
        ..Default::default()
    }
}

fn mongo_service(mongo: &MongoConfig, ports: &PortSettings) -> Service {
    let mut environment = BTreeMap::new();
    environment.insert(
        "MONGO_INITDB_ROOT_USERNAME".to_string(),
        mongo.username.clone(),
    );
    environment.insert(
        "MONGO_INITDB_ROOT_PASSWORD".to_string(),
        mongo.password.clone(),
    );

    Service {
        image: "mongo:4.4.25".to_string(),
        hostname: Some("mongo".to_string()),
        ports: vec![format!("0.0.0.0:{}:27017", ports.mongo_port)],
        environment,
        networks: erxes_networks(),
        volumes: vec!["./mongodata:/data/db".to_string()],
        extra_hosts: vec!["mongo:127.0.0.1".to_string()],
        ..Default::default()
    }
}

fn elasticsearch_service() -> Service {
    let mut environment = BTreeMap::new();
    environment.insert("discovery.type".to_string(), "single-node".to_string());

    Service {
        image: "docker.elastic.co/elasticsearch/elasticsearch:7.8.0".to_string(),
        ports: vec!["9200:9200".to_string()],
        environment,
        networks: erxes_networks(),
        volumes: vec!["./elasticsearchData:/usr/share/elasticsearch/data".to_string()],
        ulimits: Some(Ulimits::unlimited_memlock()),
        ..Default::default()
    }
}

fn redis_service(redis: &RedisConfig, ports: &PortSettings) -> Service {
    Service {
        image: "redis:7.2.1".to_string(),
        command: Some(format!(
            "redis-server --appendonly yes --requirepass {}",
            redis.password
        )),
        ports: vec![format!("{}:6379", ports.redis_port)],
        networks: erxes_networks(),
        volumes: vec!["./redisdata:/data".to_string()],
        ..Default::default()
    }
}

fn rabbitmq_service(rabbitmq: &RabbitmqConfig, ports: &PortSettings) -> Service {
    let mut environment = BTreeMap::new();
    environment.insert(
        "RABBITMQ_VM_MEMORY_HIGH_WATERMARK".to_string(),
        "2048MiB".to_string(),
    );
    environment.insert("RABBITMQ_ERLANG_COOKIE".to_string(), rabbitmq.cookie.clone());
    environment.insert("RABBITMQ_DEFAULT_USER".to_string(), rabbitmq.user.clone());
    environment.insert("RABBITMQ_DEFAULT_PASS".to_string(), rabbitmq.pass.clone());
    environment.insert("RABBITMQ_DEFAULT_VHOST".to_string(), rabbitmq.vhost.clone());

    Service {
        image: "rabbitmq:3.7.17-management".to_string(),
        hostname: Some("rabbitmq".to_string()),
        ports: vec![
            format!("{}:5672", ports.rabbitmq_port),
            "15672:15672".to_string(),
        ],
        environment,
        networks: erxes_networks(),
        volumes: vec!["./rabbitmq-data:/var/lib/rabbitmq".to_string()],
        ..Default::default()
    }
}
