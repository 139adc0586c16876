//! # Reconciling Source Revisions Against the Archive
//!
//! This module is the diff engine of a sync run. Each source revision gets a
//! synthetic filename combining its base name and commit timestamp; the
//! revisions whose synthetic name is missing from the archive snapshot form
//! the run's [`TransferSet`]. Nothing is persisted between runs: the archive
//! listing is the only record of what has already been transferred.
//!
//! ## Submodules
//!
//! - **naming**: Synthetic filename construction.
//! - **reconciler**: The set difference itself.
//! - **types**: Transfer set and reconciliation result types.

mod naming;
mod reconciler;
mod types;

pub use naming::synthetic_name;
pub use reconciler::reconcile;
pub use types::{NameCollision, Reconciliation, TransferItem, TransferSet};
