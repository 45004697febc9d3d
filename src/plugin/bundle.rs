//! Plugin UI bundle synchronization
//!
//! Each plugin ships a prebuilt frontend archive (`build.tar`) in one
//! of several buckets, keyed by the release channel. Syncing downloads
//! the archive into `plugin-uis/plugin-{name}-ui/`, extracts it in
//! place, and removes the archive.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::runtime::{archive, download};
use crate::storage::Configuration;
use crate::storage::Workdir;

/// Pre-release channels served from their own buckets
pub const BUILD_CHANNELS: [&str; 5] = ["dev", "staging", "v2", "rc", "master"];

const BUNDLE_ARCHIVE: &str = "build.tar";

/// Bucket address holding a plugin's UI builds for the given tag
pub fn bundle_source(name: &str, tag: Option<&str>) -> String {
    let ui_name = format!("plugin-{}-ui", name);

    match tag {
        None => format!(
            "https://erxes-plugins.s3.us-west-2.amazonaws.com/uis/{}",
            ui_name
        ),
        Some(tag) if BUILD_CHANNELS.contains(&tag) => format!(
            "https://erxes-{}-plugins.s3.us-west-2.amazonaws.com/uis/{}",
            tag, ui_name
        ),
        Some(tag) => format!(
            "https://erxes-release-plugins.s3.us-west-2.amazonaws.com/uis/{}/{}",
            ui_name, tag
        ),
    }
}

/// Resolves the archive URL for one plugin
///
/// An explicit location wins; otherwise the bucket follows the tag
/// override, then the configuration tag.
pub fn resolve_archive_url(
    config: &Configuration,
    name: &str,
    tag_override: Option<&str>,
    location: Option<&str>,
) -> String {
    if let Some(location) = location {
        return location.to_string();
    }

    let tag = tag_override
        .map(str::to_string)
        .or_else(|| config.image_tag.clone())
        .filter(|t| !t.is_empty());

    format!("{}/{}", bundle_source(name, tag.as_deref()), BUNDLE_ARCHIVE)
}

/// Downloads and extracts one plugin's UI bundle
///
/// A failed download aborts before extraction; a failed extraction may
/// leave partially extracted files behind (no cleanup is attempted).
pub fn sync_ui(workdir: &Workdir, name: &str, archive_url: &str) -> Result<PathBuf> {
    let target = workdir.ui_dir(name);
    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create bundle directory: {}", target.display()))?;

    let archive_path = target.join(BUNDLE_ARCHIVE);
    download::fetch(archive_url, &archive_path)?;

    archive::extract_tar(&archive_path, &target)?;

    fs::remove_file(&archive_path)
        .with_context(|| format!("Failed to remove {}", archive_path.display()))?;

    Ok(target)
}
