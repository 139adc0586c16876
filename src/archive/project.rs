use super::types::ArchiveSnapshot;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use log::info;
use std::path::Path;

/// The operations the sync needs from the archive service.
///
/// Uploading a name that already exists is assumed to overwrite it or be a
/// no-op, never to corrupt other files. [`BlnClient`](super::BlnClient) is
/// the production implementation.
#[async_trait]
pub trait ArchiveProject: Send + Sync {
    /// Returns one consistent snapshot of the project's files.
    async fn list_archived_files(&self, project_id: &str) -> Result<ArchiveSnapshot>;

    /// Uploads the file at `local_path`, named after its file name.
    async fn upload_file(&self, project_id: &str, local_path: &Path) -> Result<()>;
}

/// Takes the archive snapshot for a run.
///
/// Any failure is reported as [`SyncError::ArchiveList`]: without an
/// authoritative list of archived files the run cannot avoid duplicate
/// uploads, so the caller must stop before transferring anything.
pub async fn snapshot_archive(
    archive: &dyn ArchiveProject,
    project_id: &str,
) -> Result<ArchiveSnapshot> {
    let snapshot = archive
        .list_archived_files(project_id)
        .await
        .map_err(|e| match e {
            SyncError::ArchiveList { .. } => e,
            other => SyncError::ArchiveList {
                project_id: project_id.to_string(),
                reason: other.to_string(),
            },
        })?;

    match snapshot.latest_update() {
        Some(latest) => info!(
            "Archive project {} holds {} files, last updated {}",
            project_id,
            snapshot.len(),
            latest
        ),
        None => info!("Archive project {} holds {} files", project_id, snapshot.len()),
    }
    Ok(snapshot)
}
