//! HTTP download wrapper
//!
//! One archive in, one file out. Failures here are distinct from
//! extraction failures so callers can tell "source unreachable" from
//! "bad archive".

use std::fs::File;
use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Download from {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to write {path}: {source}")]
    Io { path: String, source: io::Error },
}

/// Downloads `url` into `dest`, overwriting any existing file
pub fn fetch(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let mut response = reqwest::blocking::get(url).map_err(|source| DownloadError::Request {
        url: url.to_string(),
        source,
    })?;

    if !response.status().is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let mut file = File::create(dest).map_err(|source| DownloadError::Io {
        path: dest.display().to_string(),
        source,
    })?;

    io::copy(&mut response, &mut file).map_err(|source| DownloadError::Io {
        path: dest.display().to_string(),
        source,
    })?;

    Ok(())
}
