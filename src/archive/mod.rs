//! # Listing and Uploading Archive Files
//!
//! This module talks to the destination archive, a Big Local News project.
//! It takes a single snapshot of the project's files per run (the only
//! authority on what has already been archived) and uploads new files.
//!
//! ## Submodules
//!
//! - **bln**: GraphQL client for the Big Local News platform.
//! - **project**: The `ArchiveProject` trait and snapshot helper.
//! - **types**: Archive entries and snapshots.

mod bln;
mod project;
mod types;

pub use bln::{parse_project_files, parse_upload_uri, BlnClient};
pub use project::{snapshot_archive, ArchiveProject};
pub use types::{ArchiveEntry, ArchiveSnapshot};
