use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One file stored in the archive project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File name in the project. Names written by this tool are synthetic
    /// filenames; older uploads may use any name.
    pub name: String,
    /// Last archive-side modification, when the service reports a parseable
    /// one. Used for logging only.
    pub updated_at: Option<DateTime<Utc>>,
}

/// The archive project's file list at one point in time, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSnapshot {
    files: BTreeMap<String, ArchiveEntry>,
}

impl ArchiveSnapshot {
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.files.get(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The most recent `updated_at` across all files, if any was reported.
    pub fn latest_update(&self) -> Option<DateTime<Utc>> {
        self.files.values().filter_map(|f| f.updated_at).max()
    }
}

impl FromIterator<ArchiveEntry> for ArchiveSnapshot {
    fn from_iter<I: IntoIterator<Item = ArchiveEntry>>(iter: I) -> Self {
        ArchiveSnapshot {
            files: iter.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }
}
