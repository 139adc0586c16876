use super::cache::LocalCache;
use super::types::{TransferFailure, TransferRecord, TransferReport, TransferStage};
use crate::archive::ArchiveProject;
use crate::error::SyncError;
use crate::reconcile::{TransferItem, TransferSet};
use crate::source::SourceRepository;
use crate::utils::digest_file;
use log::{debug, error, info};
use std::time::Duration;

/// Moves each file of a transfer set from the source into the archive.
pub struct TransferPipeline<'a> {
    pub source: &'a dyn SourceRepository,
    pub archive: &'a dyn ArchiveProject,
    pub project_id: &'a str,
    pub cache: &'a LocalCache,
    /// Pause between consecutive files, to stay under both services' rate
    /// limits.
    pub pause: Duration,
}

impl<'a> TransferPipeline<'a> {
    /// Transfers every item, one at a time, in synthetic-name order.
    ///
    /// Failures are recorded and the loop moves on to the next item; nothing
    /// is retried within the run. A failed file is still missing from the
    /// archive, so the next run selects it again.
    pub async fn run(&self, transfer_set: &TransferSet) -> TransferReport {
        let mut report = TransferReport::default();
        info!(
            "{} files to send to project {}",
            transfer_set.len(),
            self.project_id
        );

        for (i, item) in transfer_set.values().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            match self.transfer_one(item).await {
                Ok(record) => {
                    info!(
                        "[{}/{}] {} archived ({} bytes, sha256 {})",
                        i + 1,
                        transfer_set.len(),
                        record.synthetic_name,
                        record.bytes,
                        record.sha256
                    );
                    report.transferred.push(record);
                }
                Err(failure) => {
                    error!(
                        "[{}/{}] {} failed at {}: {}",
                        i + 1,
                        transfer_set.len(),
                        failure.synthetic_name,
                        failure.stage,
                        failure.reason
                    );
                    report.failures.push(failure);
                }
            }
        }

        info!(
            "Transferred {} files ({} from cache), {} failed",
            report.transferred.len(),
            report.cache_hits(),
            report.failures.len()
        );
        report
    }

    async fn transfer_one(&self, item: &TransferItem) -> Result<TransferRecord, TransferFailure> {
        let name = item.synthetic_name.as_str();
        let fail = |stage: TransferStage, e: SyncError| TransferFailure {
            synthetic_name: name.to_string(),
            stage,
            reason: e.to_string(),
        };

        let path = self
            .cache
            .path_for(name)
            .map_err(|e| fail(TransferStage::Download, e))?;
        let cache_hit = self
            .cache
            .contains(name)
            .await
            .map_err(|e| fail(TransferStage::Download, e))?;

        if cache_hit {
            debug!("{} found in cache, skipping download", name);
        } else {
            debug!("Downloading {} from {}", name, item.retrieval_location);
            self.cache
                .store(name, self.source, &item.retrieval_location)
                .await
                .map_err(|e| fail(TransferStage::Download, e))?;
        }

        let (bytes, sha256) = digest_file(&path)
            .await
            .map_err(|e| fail(TransferStage::Upload, e))?;
        self.archive
            .upload_file(self.project_id, &path)
            .await
            .map_err(|e| fail(TransferStage::Upload, e))?;

        Ok(TransferRecord {
            synthetic_name: name.to_string(),
            bytes,
            sha256,
            cache_hit,
        })
    }
}
