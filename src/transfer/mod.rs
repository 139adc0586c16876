//! # Fetching and Uploading New Files
//!
//! This module carries out a run's transfer set: each selected revision is
//! downloaded into a local cache (unless already there) and uploaded to the
//! archive under its synthetic filename, one file at a time with a fixed
//! pause in between.
//!
//! ## Submodules
//!
//! - **cache**: The local download cache.
//! - **pipeline**: The sequential fetch-and-upload loop.
//! - **types**: Per-file outcomes and the transfer report.

mod cache;
mod pipeline;
mod types;

pub use cache::LocalCache;
pub use pipeline::TransferPipeline;
pub use types::{TransferFailure, TransferRecord, TransferReport, TransferStage};
