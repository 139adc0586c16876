use crate::reconcile::synthetic_name;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Compact, filesystem-safe rendering used inside synthetic filenames.
const SANITIZED_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// The committer timestamp of one revision, always held in UTC.
///
/// Accepts either RFC 3339 (`2025-02-18T23:25:13Z`, as returned by the GitHub
/// commits API) or the already-sanitized compact form
/// (`2025-02-18T232513` with or without a trailing `Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevisionTimestamp(DateTime<Utc>);

impl RevisionTimestamp {
    /// Renders the timestamp with colons and the trailing `Z` stripped,
    /// e.g. `2025-02-18T232513`.
    pub fn sanitized(&self) -> String {
        self.0.format(SANITIZED_FORMAT).to_string()
    }
}

impl FromStr for RevisionTimestamp {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(RevisionTimestamp(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), SANITIZED_FORMAT)
            .map(|naive| RevisionTimestamp(naive.and_utc()))
            .map_err(|e| format!("invalid revision timestamp {:?}: {}", raw, e))
    }
}

impl fmt::Display for RevisionTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// One entry of a file's change history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Opaque content-version id (the commit sha).
    pub revision_id: String,
    pub timestamp: RevisionTimestamp,
}

/// One retrievable version of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Logical file name in the source folder (e.g. `fatalities.csv`).
    pub base_name: String,
    pub revision_id: String,
    pub revision_timestamp: RevisionTimestamp,
    /// Raw URL serving the bytes of exactly this revision.
    pub retrieval_location: String,
}

impl SourceEntry {
    /// The archive-side name of this revision.
    pub fn synthetic_name(&self) -> String {
        synthetic_name(&self.base_name, &self.revision_timestamp)
    }
}

/// A revision-history request that failed for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionFailure {
    pub base_name: String,
    pub reason: String,
}

/// Everything the source side produced in one run.
///
/// A non-empty `failures` list marks the listing as degraded: the entries
/// are still usable, but some files' histories are missing from them.
#[derive(Debug, Clone, Default)]
pub struct SourceListing {
    pub entries: Vec<SourceEntry>,
    pub failures: Vec<RevisionFailure>,
}

impl SourceListing {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}
