//! # Running a Sync
//!
//! Sequences the source lister, archive lister, reconciler and transfer
//! pipeline, and reports the terminal [`RunSummary`].
//!
//! ## Submodules
//!
//! - **controller**: The run sequence and alerting.
//! - **types**: The run summary.

mod controller;
mod types;

pub use controller::run_sync;
pub use types::RunSummary;
