//! # Listing and Fetching Source Files
//!
//! This module discovers which files exist in the watched GitHub folder and
//! every revision each of them has had, producing one [`SourceEntry`] per
//! (file, revision) pair. It also streams the raw bytes of a revision for the
//! transfer pipeline.
//!
//! ## Usage
//!
//! The entry point is [`collect_source_entries`], which works against any
//! [`SourceRepository`]. [`GitHubSource`] is the HTTP implementation.
//!
//! ## Submodules
//!
//! - **github**: The GitHub REST and raw-content client.
//! - **lister**: The `SourceRepository` trait and entry collection.
//! - **listing**: Typed parsers for the folder-listing and commit payloads.
//! - **types**: Data structures shared with the reconciler.

mod github;
mod lister;
mod listing;
mod types;

pub use github::GitHubSource;
pub use lister::{collect_source_entries, SourceRepository};
pub use listing::{parse_commits, parse_contents_listing, parse_embedded_listing, ListingMode};
pub use types::{Revision, RevisionFailure, RevisionTimestamp, SourceEntry, SourceListing};
