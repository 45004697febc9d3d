//! Asset synchronization commands

use anyhow::Result;

use crate::plugin::{bundle, locales};
use crate::storage::Workdir;

use super::output::Output;

pub fn syncui(
    output: &Output,
    name: &str,
    tag: Option<&str>,
    location: Option<&str>,
) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let (config, _) = workdir.config_store().load()?;

    let url = bundle::resolve_archive_url(&config, name, tag, location);
    output.step(&format!("Downloading {} UI bundle from {}", name, url));

    let target = bundle::sync_ui(&workdir, name, &url)?;
    output.success(&format!(
        "Synced {} UI bundle into {}",
        name,
        target.display()
    ));

    Ok(())
}

pub fn locales(output: &Output) -> Result<()> {
    let workdir = Workdir::open_current()?;
    let (config, _) = workdir.config_store().load()?;

    let url = locales::resolve_archive_url(&config);
    output.step(&format!("Downloading locales from {}", url));

    let report = locales::sync_locales(&workdir, &config)?;

    for failure in &report.failures {
        output.error(&format!(
            "Failed to merge {}: {}",
            failure.file.display(),
            failure.error
        ));
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "merged": report.merged,
            "failed": report.failures.len(),
        }));
    } else {
        output.success(&format!(
            "Locales updated ({} file(s) merged)",
            report.merged.len()
        ));
    }

    if !report.failures.is_empty() {
        anyhow::bail!("{} locale file(s) failed to merge", report.failures.len());
    }

    Ok(())
}
