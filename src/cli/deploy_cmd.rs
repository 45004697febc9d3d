//! Stack compilation and deployment commands

use std::fs;

use anyhow::{Context, Result};

use crate::compose::{self, BackendMode, PortSettings, APP_STACK, DB_STACK};
use crate::runtime::{archive, docker};
use crate::storage::{ConfigError, Workdir};

use super::output::Output;

/// Compiles the datastore stack and hands it to the docker engine
pub fn deploy_dbs(
    output: &Output,
    mode: BackendMode,
    ports: &PortSettings,
    compile_only: bool,
) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let (config, _) = workdir.config_store().load()?;

    let manifest = compose::compile_db_stack(&config, mode, ports)?;
    workdir.ensure_data_dirs(&config)?;

    let path = workdir.db_manifest_path();
    fs::write(&path, manifest.to_yaml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output.verbose_ctx("deploy-dbs", &format!("Wrote {}", path.display()));

    if compile_only {
        output.success(&format!("Generated {}", path.display()));
        return Ok(());
    }

    output.step("Cleaning up");
    docker::cleanup(workdir.root());

    output.step("Deploying databases");
    docker::deploy_stack(workdir.root(), &path, DB_STACK, mode)?;
    output.success("Databases deployed.");

    Ok(())
}

/// Compiles the application stack and hands it to the docker engine
pub fn up(
    output: &Output,
    mode: BackendMode,
    ports: &PortSettings,
    compile_only: bool,
) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let (config, _) = workdir.config_store().load()?;

    let manifest = compose::compile_app_stack(&config, mode, ports)?;

    let path = workdir.app_manifest_path();
    fs::write(&path, manifest.to_yaml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output.verbose_ctx("up", &format!("Wrote {}", path.display()));

    if compile_only {
        output.success(&format!("Generated {}", path.display()));
        return Ok(());
    }

    output.step("Deploying erxes");
    docker::deploy_stack(workdir.root(), &path, APP_STACK, mode)?;
    output.success("erxes deployed.");

    Ok(())
}

/// Dumps one mongo database from the running container
pub fn dump_db(output: &Output, db_name: &str, copy_dump: bool) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let (config, _) = workdir.config_store().load()?;

    let mongo = config
        .mongo
        .as_ref()
        .ok_or(ConfigError::MissingDatastore("mongo"))?;

    let container = docker::find_mongo_container()?;
    output.verbose_ctx("dump-db", &format!("Using container {}", container));

    output.step("Running mongodump");
    docker::mongodump(&container, &mongo.username, &mongo.password, db_name)?;

    if copy_dump {
        output.step("Copying dump");
        docker::copy_from_container(&container, "/dump", workdir.root())?;

        output.step("Compressing dump");
        archive::create_tar(&workdir.root().join("dump.tar"), workdir.root(), "dump")?;

        output.step("Removing dump from container");
        docker::remove_in_container(&container, "/dump")?;

        let extracted = workdir.root().join("dump");
        fs::remove_dir_all(&extracted)
            .with_context(|| format!("Failed to remove {}", extracted.display()))?;
    }

    output.success(&format!("Dumped database '{}'", db_name));

    Ok(())
}
