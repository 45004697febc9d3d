//! External collaborators
//!
//! Thin blocking wrappers around the processes and network calls the
//! core delegates to: the docker engine, the `tar` extractor, and HTTP
//! downloads. Each call has a single pass/fail outcome; retries, if
//! any, belong to the caller.

pub mod archive;
pub mod docker;
pub mod download;

pub use archive::ArchiveError;
pub use download::DownloadError;
