use crate::reconcile::NameCollision;
use crate::source::RevisionFailure;
use crate::transfer::TransferFailure;
use std::fmt;

/// Terminal report of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct synthetic names found on the source side.
    pub candidates: usize,
    pub already_archived: usize,
    pub transferred: usize,
    /// Files whose revision history could not be read.
    pub revision_failures: Vec<RevisionFailure>,
    pub transfer_failures: Vec<TransferFailure>,
    pub collisions: Vec<NameCollision>,
}

impl RunSummary {
    /// Total of revision-history and transfer failures.
    pub fn failed(&self) -> usize {
        self.revision_failures.len() + self.transfer_failures.len()
    }

    /// A degraded run completed, but some files were skipped because of
    /// errors and will be picked up by a later run.
    pub fn is_degraded(&self) -> bool {
        self.failed() > 0
    }

    /// `true` when the run found nothing to transfer.
    pub fn nothing_new(&self) -> bool {
        self.transferred == 0 && self.transfer_failures.is_empty()
    }

    /// Names of everything that failed, each tagged with where it failed.
    pub fn failed_files(&self) -> Vec<String> {
        self.revision_failures
            .iter()
            .map(|f| format!("{} (revision history)", f.base_name))
            .chain(
                self.transfer_failures
                    .iter()
                    .map(|f| format!("{} ({})", f.synthetic_name, f.stage)),
            )
            .collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidate files, {} already archived, {} transferred, {} failed",
            self.candidates,
            self.already_archived,
            self.transferred,
            self.failed()
        )?;
        if self.is_degraded() {
            write!(f, " [{}]", self.failed_files().join(", "))?;
        }
        if !self.collisions.is_empty() {
            write!(f, "; {} name collisions skipped", self.collisions.len())?;
        }
        Ok(())
    }
}
