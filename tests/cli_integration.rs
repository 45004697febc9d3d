//! CLI integration tests for the erxes deployment tool
//!
//! These tests verify the complete workflow from initialization through
//! manifest compilation and plugin lifecycle, ensuring commands work
//! together correctly. Everything runs with `--compile-only`; no docker
//! engine or network access is required.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the erxes binary
fn erxes_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("erxes"));
    // Keep the host environment from leaking into backend/port selection
    for var in [
        "DEPLOYMENT_METHOD",
        "SERVICE_INTERNAL_PORT",
        "GATEWAY_PORT",
        "UI_PORT",
        "MONGO_PORT",
        "REDIS_PORT",
        "RABBITMQ_PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Create a temporary directory and initialize a deployment in it
fn setup_deployment() -> TempDir {
    let dir = TempDir::new().unwrap();
    erxes_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["--domain", "example.erxes.io"])
        .assert()
        .success();
    dir
}

/// Write a full configuration with all datastores and one plugin
fn write_full_config(dir: &TempDir) {
    let config = r#"{
    "domain": "example.erxes.io",
    "plugins": [
        { "name": "sales", "replicas": 3 }
    ],
    "mongo": {
        "username": "erxes",
        "password": "mongopass",
        "replication": true
    },
    "redis": { "password": "redispass" },
    "rabbitmq": {
        "cookie": "cookie",
        "user": "erxes",
        "pass": "rabbitpass",
        "vhost": "/"
    },
    "elasticsearch": {}
}
"#;
    fs::write(dir.path().join("configs.json"), config).unwrap();
}

fn read_config(dir: &TempDir) -> serde_json::Value {
    let content = fs::read_to_string(dir.path().join("configs.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    erxes_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["--domain", "example.erxes.io"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized erxes deployment"));

    assert!(dir.path().join("configs.json").is_file());
    assert!(dir.path().join("plugin-uis").is_dir());
    assert!(dir.path().join("locales").is_dir());

    let config = read_config(&dir);
    assert_eq!(config["domain"], "example.erxes.io");
}

#[test]
fn test_init_keeps_existing_config() {
    let dir = setup_deployment();

    erxes_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["--domain", "other.erxes.io"])
        .assert()
        .success();

    let config = read_config(&dir);
    assert_eq!(config["domain"], "example.erxes.io");
}

#[test]
fn test_commands_require_initialization() {
    let dir = TempDir::new().unwrap();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("erxes init"));

    erxes_cmd()
        .current_dir(dir.path())
        .args(["dump-db", "erxes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("erxes init"));
}

#[test]
fn test_dump_db_requires_mongo_section() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["dump-db", "erxes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

// =============================================================================
// Plugin Lifecycle Tests
// =============================================================================

#[test]
fn test_install_adds_plugin() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed plugin 'sales'"));

    let config = read_config(&dir);
    assert_eq!(config["plugins"][0]["name"], "sales");
}

#[test]
fn test_install_twice_keeps_one_entry() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales"])
        .assert()
        .success();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));

    let config = read_config(&dir);
    assert_eq!(config["plugins"].as_array().unwrap().len(), 1);
}

#[test]
fn test_uninstall_removes_plugin() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales"])
        .assert()
        .success();
    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "inbox"])
        .assert()
        .success();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["uninstall", "sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uninstalled plugin 'sales'"));

    let config = read_config(&dir);
    let plugins = config["plugins"].as_array().unwrap();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0]["name"], "inbox");
}

#[test]
fn test_uninstall_absent_plugin_is_noop() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["uninstall", "sales"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not installed"));

    let config = read_config(&dir);
    assert!(config["plugins"].as_array().unwrap().is_empty());
}

#[test]
fn test_install_json_output() {
    let dir = setup_deployment();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["install", "sales", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#));
}

// =============================================================================
// Datastore Stack Tests
// =============================================================================

#[test]
fn test_deploy_dbs_compile_only() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .args(["deploy-dbs", "--compile-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker-compose-dbs.yml"));

    let yaml = fs::read_to_string(dir.path().join("docker-compose-dbs.yml")).unwrap();
    assert!(yaml.contains("mongo:4.4.25"));
    assert!(yaml.contains("redis:7.2.1"));
    assert!(yaml.contains("rabbitmq:3.7.17-management"));
    assert!(yaml.contains("elasticsearch:7.8.0"));
    assert!(yaml.contains("MONGO_INITDB_ROOT_PASSWORD: mongopass"));

    // Volume directories for the co-located datastores
    assert!(dir.path().join("mongodata").is_dir());
    assert!(dir.path().join("redisdata").is_dir());
    assert!(dir.path().join("elasticsearchData").is_dir());
    assert!(dir.path().join("rabbitmq-data").is_dir());
}

#[test]
fn test_deploy_dbs_is_idempotent() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .args(["deploy-dbs", "--compile-only"])
        .assert()
        .success();
    let first = fs::read(dir.path().join("docker-compose-dbs.yml")).unwrap();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["deploy-dbs", "--compile-only"])
        .assert()
        .success();
    let second = fs::read(dir.path().join("docker-compose-dbs.yml")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_deploy_dbs_requires_domain() {
    let dir = setup_deployment();
    fs::write(dir.path().join("configs.json"), r#"{"domain": ""}"#).unwrap();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["deploy-dbs", "--compile-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing domain"));
}

#[test]
fn test_deploy_dbs_port_override_from_env() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .env("MONGO_PORT", "37017")
        .args(["deploy-dbs", "--compile-only"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("docker-compose-dbs.yml")).unwrap();
    assert!(yaml.contains("0.0.0.0:37017:27017"));
}

// =============================================================================
// Application Stack Tests
// =============================================================================

#[test]
fn test_up_compile_only_swarm() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .args(["up", "--compile-only"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(yaml.contains("plugin-sales-api"));
    assert!(yaml.contains("erxes/plugin-sales-api:federation"));
    assert!(yaml.contains("SERVICE_NAME: sales"));
    assert!(yaml.contains("NODE_ENV: production"));
    // Co-located datastores resolve to swarm service names
    assert!(yaml.contains("REDIS_HOST: erxes-dbs_redis"));
    // Replica directive is honored under swarm
    assert!(yaml.contains("replicas: 3"));
    // The erxes network is externally managed under local swarm
    assert!(yaml.contains("external: true"));
}

#[test]
fn test_up_compose_mode_drops_replicas() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .args(["up", "--compile-only", "--method", "docker-compose"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(!yaml.contains("replicas"));
    assert!(yaml.contains("REDIS_HOST: redis"));
    assert!(yaml.contains("driver: bridge"));
}

#[test]
fn test_up_remote_datastore_mode() {
    let dir = setup_deployment();
    let config = r#"{
    "domain": "example.erxes.io",
    "db_server_address": "10.0.0.5",
    "plugins": [{ "name": "sales" }],
    "mongo": { "username": "erxes", "password": "pw" },
    "redis": { "password": "redispass" },
    "rabbitmq": { "cookie": "", "user": "erxes", "pass": "guest", "vhost": "/" }
}
"#;
    fs::write(dir.path().join("configs.json"), config).unwrap();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["up", "--compile-only"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(yaml.contains("driver: overlay"));
    assert!(yaml.contains("mongo:10.0.0.5"));
    assert!(yaml.contains(
        "MONGO_URL: mongodb://erxes:pw@10.0.0.5:27017/erxes?authSource=admin&replicaSet=rs0"
    ));
}

#[test]
fn test_up_rejects_plugin_without_datastores() {
    let dir = setup_deployment();
    let config = r#"{
    "domain": "example.erxes.io",
    "plugins": [{ "name": "sales" }]
}
"#;
    fs::write(dir.path().join("configs.json"), config).unwrap();

    erxes_cmd()
        .current_dir(dir.path())
        .args(["up", "--compile-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn test_deployment_method_env_selects_backend() {
    let dir = setup_deployment();
    write_full_config(&dir);

    erxes_cmd()
        .current_dir(dir.path())
        .env("DEPLOYMENT_METHOD", "docker-compose")
        .args(["up", "--compile-only"])
        .assert()
        .success();

    let yaml = fs::read_to_string(dir.path().join("docker-compose.yml")).unwrap();
    assert!(!yaml.contains("replicas"));
    assert!(yaml.contains("driver: bridge"));
}
