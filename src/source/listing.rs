//! Typed adapters over the GitHub payloads the source lister reads.
//!
//! Every function here is pure: it takes a response body and either returns
//! typed data or a typed error. Upstream format drift shows up as
//! [`SyncError::Parse`] (folder listings) or [`SyncError::Fetch`] (revision
//! histories) instead of a panic on a missing field.

use super::types::{Revision, RevisionTimestamp};
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::collections::BTreeSet;

/// How the watched folder's file names are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListingMode {
    /// The documented REST contents endpoint.
    Api,
    /// The JSON blob embedded in the folder's HTML page.
    Html,
}

/// Opening tag attribute of the script holding the HTML page's data blob.
const EMBEDDED_MARKER: &str = r#"data-target="react-app.embeddedData">"#;
const SCRIPT_END: &str = "</script>";

#[derive(Debug, Deserialize)]
struct ContentsItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddedData {
    payload: EmbeddedPayload,
}

#[derive(Debug, Deserialize)]
struct EmbeddedPayload {
    tree: EmbeddedTree,
}

#[derive(Debug, Deserialize)]
struct EmbeddedTree {
    items: Vec<EmbeddedItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedItem {
    name: String,
    #[serde(rename = "contentType", default)]
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: CommitPerson,
}

#[derive(Debug, Deserialize)]
struct CommitPerson {
    date: String,
}

/// Parses a `GET /repos/{owner}/{repo}/contents/{path}` response into the
/// names of the regular files it lists. Subdirectories and symlinks are
/// skipped.
pub fn parse_contents_listing(url: &str, body: &str) -> Result<BTreeSet<String>> {
    let items: Vec<ContentsItem> = serde_json::from_str(body).map_err(|e| SyncError::Parse {
        url: url.to_string(),
        reason: format!("expected a JSON array of directory items: {}", e),
    })?;
    Ok(items
        .into_iter()
        .filter(|item| item.kind == "file")
        .map(|item| item.name)
        .collect())
}

/// Extracts file names from the data blob embedded in a folder's HTML page.
///
/// The blob lives in a `<script data-target="react-app.embeddedData">` tag and
/// lists the folder under `payload.tree.items`. Items explicitly marked as
/// anything other than `file` are skipped.
pub fn parse_embedded_listing(url: &str, html: &str) -> Result<BTreeSet<String>> {
    let parse_err = |reason: String| SyncError::Parse {
        url: url.to_string(),
        reason,
    };

    let start = html
        .find(EMBEDDED_MARKER)
        .ok_or_else(|| parse_err("embedded data script tag not found".to_string()))?
        + EMBEDDED_MARKER.len();
    let rest = &html[start..];
    let end = rest
        .find(SCRIPT_END)
        .ok_or_else(|| parse_err("embedded data script tag is not closed".to_string()))?;

    let data: EmbeddedData = serde_json::from_str(&rest[..end])
        .map_err(|e| parse_err(format!("unexpected embedded data structure: {}", e)))?;

    Ok(data
        .payload
        .tree
        .items
        .into_iter()
        .filter(|item| item.content_type.as_deref().map_or(true, |t| t == "file"))
        .map(|item| item.name)
        .collect())
}

/// Parses one page of a `GET /repos/{owner}/{repo}/commits` response.
///
/// `target` names the file whose history was requested; it only feeds the
/// error message.
pub fn parse_commits(target: &str, body: &str) -> Result<Vec<Revision>> {
    let fetch_err = |reason: String| SyncError::Fetch {
        target: target.to_string(),
        reason,
    };

    let items: Vec<CommitItem> = serde_json::from_str(body)
        .map_err(|e| fetch_err(format!("unexpected commit history payload: {}", e)))?;

    items
        .into_iter()
        .map(|item| {
            let timestamp: RevisionTimestamp =
                item.commit.committer.date.parse().map_err(&fetch_err)?;
            Ok(Revision {
                revision_id: item.sha,
                timestamp,
            })
        })
        .collect()
}
