use std::fmt;

/// Step of a transfer that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Download,
    Upload,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStage::Download => f.write_str("download"),
            TransferStage::Upload => f.write_str("upload"),
        }
    }
}

/// A file that could not be transferred this run. It stays absent from the
/// archive, so the next run selects it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub synthetic_name: String,
    pub stage: TransferStage,
    pub reason: String,
}

/// A file that reached the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub synthetic_name: String,
    pub bytes: u64,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
    /// `true` when the bytes came from the local cache instead of the source.
    pub cache_hit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub transferred: Vec<TransferRecord>,
    pub failures: Vec<TransferFailure>,
}

impl TransferReport {
    pub fn cache_hits(&self) -> usize {
        self.transferred.iter().filter(|r| r.cache_hit).count()
    }
}
