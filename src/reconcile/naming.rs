use crate::source::RevisionTimestamp;

/// Builds the archive-side name of one revision of `base_name`.
///
/// The name is `<stem>_<timestamp>` followed by the base name's extension,
/// where the stem is everything before the first `.` and the extension
/// everything after it. A name without a dot gets no extension.
///
/// Splitting at the first dot rather than the last is deliberate: it keeps
/// names identical to the files already archived by earlier versions of this
/// sync, so multi-dot names like `dump.tar.gz` are not uploaded a second time
/// under a different name.
///
/// # Examples
///
/// ```rust
/// use bln_github_sync::reconcile::synthetic_name;
/// let ts = "2025-01-02T030405Z".parse().unwrap();
/// assert_eq!(synthetic_name("report.csv", &ts), "report_2025-01-02T030405.csv");
/// assert_eq!(synthetic_name("dump.tar.gz", &ts), "dump_2025-01-02T030405.tar.gz");
/// assert_eq!(synthetic_name("README", &ts), "README_2025-01-02T030405");
/// ```
pub fn synthetic_name(base_name: &str, timestamp: &RevisionTimestamp) -> String {
    let stamp = timestamp.sanitized();
    match base_name.split_once('.') {
        Some((stem, extension)) => format!("{}_{}.{}", stem, stamp, extension),
        None => format!("{}_{}", base_name, stamp),
    }
}
