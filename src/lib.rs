//! BLN GitHub Sync Library
//!
//! This library archives new revisions of the files in a GitHub folder into a
//! Big Local News project. Every run compares the source's full revision
//! history against the archive's current file list and uploads only what is
//! missing, so no local sync state is kept between runs.
//!

pub mod alert;
pub mod archive;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod run;
pub mod source;
pub mod transfer;
pub mod utils;

pub use error::{Result, SyncError};
