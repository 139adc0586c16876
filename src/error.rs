//! Error taxonomy for a sync run.
//!
//! Variants split into two groups. Fatal errors (`Config`, `Parse`, `Listing`,
//! `EmptyListing`, `ArchiveList`) abort the run before any upload. Per-file
//! errors (`Fetch`, `Upload`, `InvalidName`) are recorded and the run moves on.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while syncing a source folder into the archive.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required setting is missing or blank.
    #[error("configuration error: {0}")]
    Config(String),

    /// The source folder listing did not have the expected structure.
    #[error("could not parse folder listing from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The source folder listing request itself failed.
    #[error("folder listing request to {url} failed: {reason}")]
    Listing { url: String, reason: String },

    /// The folder listing parsed but named no files.
    #[error("folder listing from {url} contained no files")]
    EmptyListing { url: String },

    /// A revision-history or raw-content request failed for one file.
    #[error("fetch of {target} failed: {reason}")]
    Fetch { target: String, reason: String },

    /// The archive project's file listing could not be obtained.
    #[error("archive listing for project {project_id} failed: {reason}")]
    ArchiveList { project_id: String, reason: String },

    /// Uploading one file to the archive failed.
    #[error("upload of {name} failed: {reason}")]
    Upload { name: String, reason: String },

    /// A synthetic filename is not safe to use as a cache path.
    #[error("refusing unsafe file name {0:?}")]
    InvalidName(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SyncError {
    /// Returns `true` for errors that must stop the run before any upload.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_)
                | SyncError::Parse { .. }
                | SyncError::Listing { .. }
                | SyncError::EmptyListing { .. }
                | SyncError::ArchiveList { .. }
        )
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SyncError>;
