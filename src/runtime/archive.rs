//! Archive extraction via the external `tar` process

use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to run tar: {0}")]
    Spawn(std::io::Error),

    #[error("Extraction of {archive} failed: {stderr}")]
    Failed { archive: String, stderr: String },

    #[error("Creating {archive} failed: {stderr}")]
    Create { archive: String, stderr: String },
}

/// Extracts a tar archive into `dest`
pub fn extract_tar(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let output = Command::new("tar")
        .arg("-xf")
        .arg(archive)
        .arg(format!("--directory={}", dest.display()))
        .output()
        .map_err(ArchiveError::Spawn)?;

    if !output.status.success() {
        return Err(ArchiveError::Failed {
            archive: archive.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Creates a tar archive holding `source`, resolved relative to `dir`
pub fn create_tar(archive: &Path, dir: &Path, source: &str) -> Result<(), ArchiveError> {
    let output = Command::new("tar")
        .arg("-cf")
        .arg(archive)
        .arg(source)
        .current_dir(dir)
        .output()
        .map_err(ArchiveError::Spawn)?;

    if !output.status.success() {
        return Err(ArchiveError::Create {
            archive: archive.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
