use super::types::{Revision, RevisionFailure, SourceEntry, SourceListing};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use tokio::io::AsyncWrite;

/// The operations the sync needs from a source repository.
///
/// `GitHubSource` is the production implementation; tests supply in-memory
/// fakes.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Human-readable location of the watched folder, for logs and alerts.
    fn label(&self) -> String;

    /// Lists the base names of the files currently in the watched folder.
    ///
    /// Fails with [`SyncError::Parse`] when the listing payload does not have
    /// the expected structure.
    async fn list_files(&self) -> Result<BTreeSet<String>>;

    /// Lists every revision of one file, in whatever order the source
    /// reports them.
    async fn list_revisions(&self, base_name: &str) -> Result<Vec<Revision>>;

    /// Builds the URL serving `base_name` exactly as of `revision_id`.
    fn raw_url(&self, revision_id: &str, base_name: &str) -> String;

    /// Streams the bytes at `location` into `sink`, returning the byte count.
    async fn fetch_into(
        &self,
        location: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64>;
}

/// Collects one `SourceEntry` for every revision of every file in the folder.
///
/// The folder listing is authoritative: if it fails, or names no files, the
/// whole run stops here, since an empty or partial list would be misread as
/// "nothing new" or "everything new". A failed revision-history request only
/// affects its own file; it is logged, recorded in
/// [`SourceListing::failures`], and the remaining files are still processed.
///
/// # Arguments
///
/// * `repo` - The source repository to list.
///
/// # Returns
///
/// * `Ok(SourceListing)` - Entries sorted by base name, plus per-file failures.
/// * `Err(SyncError)` - A fatal folder-listing error.
pub async fn collect_source_entries(repo: &dyn SourceRepository) -> Result<SourceListing> {
    let label = repo.label();
    let files = repo.list_files().await?;
    if files.is_empty() {
        return Err(SyncError::EmptyListing { url: label });
    }
    info!("Found {} files in {}", files.len(), label);

    let mut listing = SourceListing::default();
    for base_name in &files {
        match repo.list_revisions(base_name).await {
            Ok(revisions) => {
                if revisions.is_empty() {
                    warn!("No revisions reported for {}", base_name);
                }
                debug!("{} has {} revisions", base_name, revisions.len());
                for revision in revisions {
                    listing.entries.push(SourceEntry {
                        base_name: base_name.clone(),
                        retrieval_location: repo.raw_url(&revision.revision_id, base_name),
                        revision_id: revision.revision_id,
                        revision_timestamp: revision.timestamp,
                    });
                }
            }
            Err(e) => {
                error!("Revision history for {} failed: {}", base_name, e);
                listing.failures.push(RevisionFailure {
                    base_name: base_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Collected {} revisions from {} files, {} files failed",
        listing.entries.len(),
        files.len() - listing.failures.len(),
        listing.failures.len()
    );
    Ok(listing)
}
