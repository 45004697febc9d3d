//! Docker engine invocation
//!
//! The apply side of the pipeline: hand a generated compose file to the
//! engine, remove services, prune leftovers. Exit codes are not
//! interpreted beyond pass/fail; stderr is surfaced verbatim.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::compose::BackendMode;

/// Applies a compose file as a stack
pub fn deploy_stack(dir: &Path, compose_file: &Path, stack: &str, mode: BackendMode) -> Result<()> {
    let mut command = Command::new("docker");

    match mode {
        BackendMode::Swarm => {
            command
                .args(["stack", "deploy", "--compose-file"])
                .arg(compose_file)
                .arg(stack)
                .args(["--with-registry-auth", "--resolve-image", "changed"]);
        }
        BackendMode::Compose => {
            command
                .args(["compose", "-f"])
                .arg(compose_file)
                .args(["up", "-d"]);
        }
    }

    run(command.current_dir(dir))
}

/// Removes one running service
pub fn remove_service(name: &str) -> Result<()> {
    run(Command::new("docker").args(["service", "rm", name]))
}

/// Finds the name of the running mongo container
pub fn find_mongo_container() -> Result<String> {
    let output = Command::new("docker")
        .args(["ps", "--format", "{{.Names}}"])
        .output()
        .context("Failed to run docker")?;

    if !output.status.success() {
        bail!(
            "docker exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("mongo"))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No running mongo container found"))
}

/// Runs mongodump for one database inside the mongo container
pub fn mongodump(container: &str, username: &str, password: &str, db_name: &str) -> Result<()> {
    run(Command::new("docker").args([
        "exec",
        container,
        "mongodump",
        "-u",
        username,
        "-p",
        password,
        "--authenticationDatabase",
        "admin",
        "--db",
        db_name,
    ]))
}

/// Copies a path out of a container into `dir`
pub fn copy_from_container(container: &str, source: &str, dir: &Path) -> Result<()> {
    run(Command::new("docker")
        .arg("cp")
        .arg(format!("{}:{}", container, source))
        .arg(".")
        .current_dir(dir))
}

/// Removes a path inside a container
pub fn remove_in_container(container: &str, path: &str) -> Result<()> {
    run(Command::new("docker").args(["exec", container, "rm", "-rf", path]))
}

/// Prunes exited containers and dangling images/volumes
///
/// Failures are ignored: the resources being pruned may simply not
/// exist.
pub fn cleanup(dir: &Path) {
    let commands = [
        "docker rm $(docker ps -a -q -f status=exited)",
        "docker rmi $(docker images -f dangling=true -q)",
        "docker volume rm $(docker volume ls -q -f dangling=true)",
    ];

    for command in commands {
        let _ = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .output();
    }
}

fn run(command: &mut Command) -> Result<()> {
    let output = command.output().context("Failed to run docker")?;

    if !output.status.success() {
        bail!(
            "docker exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}
