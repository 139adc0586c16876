use super::types::RunSummary;
use crate::alert::{Alerter, MessageKind};
use crate::archive::{snapshot_archive, ArchiveProject};
use crate::config::TransferSettings;
use crate::error::Result;
use crate::reconcile::reconcile;
use crate::source::{collect_source_entries, SourceRepository};
use crate::transfer::{LocalCache, TransferPipeline};
use log::{error, info, warn};

/// Runs one complete sync: list the source, snapshot the archive, reconcile,
/// then transfer whatever is new.
///
/// The outcome is always posted to `alerts` before returning. Fatal errors
/// (folder listing, archive listing, cache setup) surface as `Err` and are
/// raised before any upload is attempted. Per-file failures leave the run
/// successful but degraded; see [`RunSummary::is_degraded`].
///
/// # Arguments
///
/// * `project_id` - The archive project to sync into.
/// * `transfer` - Cache directory and pause between transfers.
/// * `source` - The source repository.
/// * `archive` - The archive service.
/// * `alerts` - Where the outcome is reported.
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run completed, possibly with per-file failures.
/// * `Err(SyncError)` - A fatal error stopped the run.
pub async fn run_sync(
    project_id: &str,
    transfer: &TransferSettings,
    source: &dyn SourceRepository,
    archive: &dyn ArchiveProject,
    alerts: &dyn Alerter,
) -> Result<RunSummary> {
    let outcome = execute(project_id, transfer, source, archive).await;
    match &outcome {
        Ok(summary) if summary.is_degraded() => {
            warn!("Run finished with failures: {}", summary);
            alerts
                .post(&format!("Sync finished with failures: {}", summary), MessageKind::Error)
                .await;
        }
        Ok(summary) if summary.nothing_new() => {
            info!("No new files found. {}", summary);
            alerts
                .post(&format!("No new files found. {}", summary), MessageKind::Notice)
                .await;
        }
        Ok(summary) => {
            info!("Run finished: {}", summary);
            alerts
                .post(&format!("Sync finished: {}", summary), MessageKind::Success)
                .await;
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            alerts
                .post(&format!("Sync aborted: {}", e), MessageKind::Error)
                .await;
        }
    }
    outcome
}

async fn execute(
    project_id: &str,
    transfer: &TransferSettings,
    source: &dyn SourceRepository,
    archive: &dyn ArchiveProject,
) -> Result<RunSummary> {
    let listing = collect_source_entries(source).await?;
    let snapshot = snapshot_archive(archive, project_id).await?;
    let reconciliation = reconcile(&listing.entries, &snapshot);

    let mut summary = RunSummary {
        candidates: reconciliation.candidates(),
        already_archived: reconciliation.already_archived,
        transferred: 0,
        revision_failures: listing.failures,
        transfer_failures: Vec::new(),
        collisions: reconciliation.collisions.clone(),
    };
    if reconciliation.is_empty() {
        return Ok(summary);
    }

    let cache = LocalCache::open(&transfer.cache_dir).await?;
    let pipeline = TransferPipeline {
        source,
        archive,
        project_id,
        cache: &cache,
        pause: transfer.pause,
    };
    let report = pipeline.run(&reconciliation.transfer_set).await;

    summary.transferred = report.transferred.len();
    summary.transfer_failures = report.failures;
    Ok(summary)
}
