use std::collections::BTreeMap;

/// One file selected for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    /// Name the file is cached and archived under.
    pub synthetic_name: String,
    pub retrieval_location: String,
    pub revision_id: String,
}

/// Files to transfer this run, keyed and iterated in synthetic-name order.
pub type TransferSet = BTreeMap<String, TransferItem>;

/// Two source revisions that map to the same synthetic name.
///
/// Only the first revision is transferred; the other is reported so the gap
/// is visible in logs and the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub synthetic_name: String,
    pub kept_revision: String,
    pub dropped_revision: String,
}

/// The result of comparing a source listing against an archive snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub transfer_set: TransferSet,
    /// Distinct synthetic names already present in the archive.
    pub already_archived: usize,
    pub collisions: Vec<NameCollision>,
}

impl Reconciliation {
    /// Number of distinct synthetic names seen on the source side.
    pub fn candidates(&self) -> usize {
        self.transfer_set.len() + self.already_archived
    }

    pub fn is_empty(&self) -> bool {
        self.transfer_set.is_empty()
    }
}
