//! Plugin install/uninstall commands

use anyhow::Result;

use crate::compose::APP_STACK;
use crate::plugin::lifecycle;
use crate::runtime::docker;
use crate::storage::Workdir;

use super::output::Output;

pub fn install(output: &Output, name: &str) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let added = lifecycle::install(&workdir.config_store(), name)?;

    if added {
        output.success(&format!("Installed plugin '{}'", name));
    } else {
        output.success(&format!("Plugin '{}' is already installed", name));
    }

    Ok(())
}

pub fn uninstall(output: &Output, name: &str, remove_service: bool) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let removed = lifecycle::uninstall(&workdir.config_store(), name)?;

    if remove_service {
        let service = format!("{}_plugin-{}-api", APP_STACK, name);
        output.verbose_ctx("uninstall", &format!("Removing service {}", service));
        docker::remove_service(&service)?;
    }

    if removed {
        output.success(&format!("Uninstalled plugin '{}'", name));
    } else {
        output.success(&format!("Plugin '{}' is not installed", name));
    }

    Ok(())
}
