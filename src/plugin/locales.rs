//! Localization catalog synchronization
//!
//! One global locale archive is downloaded and extracted into
//! `locales/`; afterwards every installed plugin that ships its own
//! locale directory has its per-language files merged into the global
//! ones. The merge is shallow: one level of keys, plugin values winning
//! on collision. It is re-run in full on every invocation and is
//! deterministic, so repeated runs with unchanged inputs are no-ops.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::runtime::{archive, download};
use crate::storage::{Configuration, Workdir};

const LOCALES_ARCHIVE: &str = "locales.tar";

/// Bucket address holding the global locale archive for the given tag
pub fn locales_source(tag: &str) -> String {
    if tag == "dev" {
        "https://erxes-dev-plugins.s3.us-west-2.amazonaws.com".to_string()
    } else {
        format!(
            "https://erxes-release-plugins.s3.us-west-2.amazonaws.com/{}",
            tag
        )
    }
}

/// Resolves the locale archive URL, defaulting to the dev channel
pub fn resolve_archive_url(config: &Configuration) -> String {
    let tag = config
        .image_tag
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "dev".to_string());

    format!("{}/{}", locales_source(&tag), LOCALES_ARCHIVE)
}

/// One catalog that could not be merged
#[derive(Debug)]
pub struct MergeFailure {
    pub file: PathBuf,
    pub error: String,
}

/// Outcome of a locale merge pass
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Global files that received plugin keys
    pub merged: Vec<String>,

    /// Files skipped because they could not be read or parsed
    pub failures: Vec<MergeFailure>,
}

/// Downloads the global locale archive, extracts it, and merges every
/// plugin's catalogs into it
pub fn sync_locales(workdir: &Workdir, config: &Configuration) -> Result<MergeReport> {
    let archive_path = workdir.root().join(LOCALES_ARCHIVE);
    download::fetch(&resolve_archive_url(config), &archive_path)?;

    let locales_dir = workdir.locales_dir();
    fs::create_dir_all(&locales_dir).with_context(|| {
        format!("Failed to create locales directory: {}", locales_dir.display())
    })?;

    archive::extract_tar(&archive_path, &locales_dir)?;

    fs::remove_file(&archive_path)
        .with_context(|| format!("Failed to remove {}", archive_path.display()))?;

    merge_plugin_locales(workdir, config)
}

/// Merges every installed plugin's locale files into the global ones
///
/// Files existing only globally, or only in a plugin, are left alone.
/// A malformed file is recorded in the report and does not stop the
/// remaining files from merging.
pub fn merge_plugin_locales(workdir: &Workdir, config: &Configuration) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let global_dir = workdir.locales_dir();

    for plugin in &config.plugins {
        let local_dir = workdir.ui_dir(&plugin.name).join("locales");
        if !local_dir.is_dir() {
            continue;
        }

        let mut file_names = Vec::new();
        let entries = fs::read_dir(&local_dir)
            .with_context(|| format!("Failed to read {}", local_dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read {}", local_dir.display()))?;
            if let Some(name) = entry.file_name().to_str() {
                file_names.push(name.to_string());
            }
        }
        file_names.sort();

        for file_name in file_names {
            let global_path = global_dir.join(&file_name);
            if !global_path.is_file() {
                continue;
            }

            let local_path = local_dir.join(&file_name);
            match merge_into_global(&global_path, &local_path) {
                Ok(()) => report.merged.push(file_name),
                Err(e) => report.failures.push(MergeFailure {
                    file: local_path,
                    error: format!("{:#}", e),
                }),
            }
        }
    }

    Ok(report)
}

fn merge_into_global(global_path: &Path, local_path: &Path) -> Result<()> {
    let global = read_catalog(global_path)?;
    let local = read_catalog(local_path)?;

    let combined = merge_catalogs(&global, &local);

    let mut content = serde_json::to_string(&combined).context("Failed to serialize catalog")?;
    content.push('\n');
    fs::write(global_path, content)
        .with_context(|| format!("Failed to write {}", global_path.display()))?;

    Ok(())
}

/// Shallow merge of two catalogs, local keys winning on collision
pub fn merge_catalogs(
    global: &Map<String, Value>,
    local: &Map<String, Value>,
) -> Map<String, Value> {
    let mut combined = global.clone();
    for (key, value) in local {
        combined.insert(key.clone(), value.clone());
    }
    combined
}

fn read_catalog(path: &Path) -> Result<Map<String, Value>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} is not a JSON object", path.display()),
    }
}
