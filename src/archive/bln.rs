use super::project::ArchiveProject;
use super::types::{ArchiveEntry, ArchiveSnapshot};
use crate::config::ArchiveSettings;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{self, Stream};
use log::{debug, info};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Size of each chunk read from a cached file while it is uploaded.
const UPLOAD_CHUNK: usize = 64 * 1024;

const PROJECT_FILES_QUERY: &str = r#"
query ProjectFiles($id: ID!) {
  node(id: $id) {
    ... on Project {
      id
      name
      files {
        name
        updatedAt
      }
    }
  }
}"#;

const CREATE_UPLOAD_URI_MUTATION: &str = r#"
mutation CreateFileUploadUri($input: FileURIInput!) {
  createFileUploadUri(input: $input) {
    ok {
      name
      uri
    }
    err
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    /// Returns the data, or every reported error joined into one message.
    fn into_data(self) -> std::result::Result<T, String> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(messages.join("; "));
        }
        self.data.ok_or_else(|| "response carried no data".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<ProjectNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    #[serde(default)]
    name: Option<String>,
    files: Option<Vec<FileNode>>,
}

#[derive(Debug, Deserialize)]
struct FileNode {
    name: String,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadUriData {
    #[serde(rename = "createFileUploadUri")]
    create_file_upload_uri: Option<UploadUriResult>,
}

#[derive(Debug, Deserialize)]
struct UploadUriResult {
    ok: Option<UploadUri>,
    err: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadUri {
    uri: String,
}

/// Parses an archive timestamp. The service reports ISO 8601, sometimes
/// without an offset; those are taken as UTC.
fn parse_updated_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .ok()
}

/// Parses the response to the project-files query into a snapshot.
///
/// GraphQL errors, an unknown project id (null `node`), or a node without a
/// `files` field all fail with [`SyncError::ArchiveList`].
pub fn parse_project_files(project_id: &str, body: &str) -> Result<ArchiveSnapshot> {
    let list_err = |reason: String| SyncError::ArchiveList {
        project_id: project_id.to_string(),
        reason,
    };

    let response: GraphQlResponse<NodeData> =
        serde_json::from_str(body).map_err(|e| list_err(format!("unexpected payload: {}", e)))?;
    let project = response
        .into_data()
        .map_err(&list_err)?
        .node
        .ok_or_else(|| list_err("project not found".to_string()))?;
    let files = project
        .files
        .ok_or_else(|| list_err("project has no file list".to_string()))?;

    debug!(
        "Project {} ({}) reports {} files",
        project_id,
        project.name.as_deref().unwrap_or("unnamed"),
        files.len()
    );
    Ok(files
        .into_iter()
        .map(|f| ArchiveEntry {
            updated_at: f.updated_at.as_deref().and_then(parse_updated_at),
            name: f.name,
        })
        .collect())
}

/// Parses the response to the upload-URI mutation into the signed URL the
/// file bytes must be sent to.
pub fn parse_upload_uri(file_name: &str, body: &str) -> Result<String> {
    let upload_err = |reason: String| SyncError::Upload {
        name: file_name.to_string(),
        reason,
    };

    let response: GraphQlResponse<UploadUriData> = serde_json::from_str(body)
        .map_err(|e| upload_err(format!("unexpected payload: {}", e)))?;
    let result = response
        .into_data()
        .map_err(&upload_err)?
        .create_file_upload_uri
        .ok_or_else(|| upload_err("no upload URI returned".to_string()))?;

    match (result.ok, result.err) {
        (_, Some(err)) => Err(upload_err(err)),
        (Some(ok), None) => Ok(ok.uri),
        (None, None) => Err(upload_err("no upload URI returned".to_string())),
    }
}

/// Reads `file` as a stream of chunks, so an upload never holds the whole
/// file in memory.
fn file_chunks(file: tokio::fs::File) -> impl Stream<Item = std::io::Result<Vec<u8>>> {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; UPLOAD_CHUNK];
        let n = file.read(&mut buf).await?;
        buf.truncate(n);
        Ok::<_, std::io::Error>((n > 0).then(|| (buf, file)))
    })
}

/// Client for a Big Local News project, over the platform's GraphQL API.
#[derive(Debug, Clone)]
pub struct BlnClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl BlnClient {
    pub fn new(client: Client, settings: &ArchiveSettings) -> Self {
        BlnClient {
            client,
            endpoint: settings.api_url.clone(),
            token: settings.api_token.clone(),
        }
    }

    /// Posts one GraphQL operation and returns the response body, or a
    /// reason string for the caller to wrap in its own error variant.
    async fn graphql(&self, query: &str, variables: Value) -> std::result::Result<String, String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("JWT {}", self.token))
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("GraphQL endpoint returned {}", status));
        }
        resp.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ArchiveProject for BlnClient {
    async fn list_archived_files(&self, project_id: &str) -> Result<ArchiveSnapshot> {
        let body = self
            .graphql(PROJECT_FILES_QUERY, json!({ "id": project_id }))
            .await
            .map_err(|reason| SyncError::ArchiveList {
                project_id: project_id.to_string(),
                reason,
            })?;
        parse_project_files(project_id, &body)
    }

    async fn upload_file(&self, project_id: &str, local_path: &Path) -> Result<()> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SyncError::InvalidName(local_path.display().to_string()))?;
        let upload_err = |reason: String| SyncError::Upload {
            name: file_name.to_string(),
            reason,
        };

        let body = self
            .graphql(
                CREATE_UPLOAD_URI_MUTATION,
                json!({ "input": { "projectId": project_id, "fileName": file_name } }),
            )
            .await
            .map_err(&upload_err)?;
        let uri = parse_upload_uri(file_name, &body)?;

        let read_err =
            |e: std::io::Error| upload_err(format!("reading {}: {}", local_path.display(), e));
        let file = tokio::fs::File::open(local_path).await.map_err(&read_err)?;
        let size = file.metadata().await.map_err(&read_err)?.len();
        let resp = self
            .client
            .put(&uri)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(file_chunks(file)))
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(upload_err(format!("storage returned {}", status)));
        }

        info!("Uploaded {} ({} bytes) to project {}", file_name, size, project_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::build_client;
    use crate::utils::test_server::{StubRequest, StubServer};
    use std::time::Duration;

    fn bln_client(server: &StubServer) -> BlnClient {
        let settings = ArchiveSettings {
            api_url: format!("{}/graphql", server.url()),
            api_token: "tok".to_string(),
            project_id: PROJECT.to_string(),
        };
        BlnClient::new(build_client(Duration::from_secs(5)).unwrap(), &settings)
    }

    /// Answers the upload-URI mutation with a signed URL on the same server,
    /// and the PUT to it with `storage_status`.
    fn upload_handler(
        storage_status: u16,
    ) -> impl Fn(&StubRequest) -> Option<(u16, String)> + Send + Sync + 'static {
        move |req| match (req.method.as_str(), req.path()) {
            ("POST", "/graphql") => {
                let host = req.header("host").unwrap_or("127.0.0.1");
                let body = json!({ "data": { "createFileUploadUri": {
                    "ok": { "name": "a.csv", "uri": format!("http://{}/upload/signed?sig=abc", host) },
                    "err": null
                }}});
                Some((200, body.to_string()))
            }
            ("PUT", "/upload/signed") => Some((storage_status, String::new())),
            _ => Some((404, "{}".to_string())),
        }
    }

    const PROJECT: &str = "UHJvamVjdDo2NzkxYTJmNi0wNTNmLTQzMTEtYjE5Yy03MTc3MzFmMGUwZDY=";

    #[test]
    fn test_parse_project_files() {
        let body = r#"{"data": {"node": {
            "id": "UHJvamVjdDo2NzkxYTJmNi0wNTNmLTQzMTEtYjE5Yy03MTc3MzFmMGUwZDY=",
            "name": "DOGE savings",
            "files": [
                {"name": "contracts_2025-02-18T232513.csv", "updatedAt": "2025-02-19T01:02:03.456789+00:00"},
                {"name": "grants_2025-02-18T232513.csv", "updatedAt": "2025-02-19T01:05:00"},
                {"name": "readme.txt", "updatedAt": null}
            ]
        }}}"#;
        let snapshot = parse_project_files(PROJECT, body).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.contains("contracts_2025-02-18T232513.csv"));
        assert!(snapshot.get("contracts_2025-02-18T232513.csv").unwrap().updated_at.is_some());
        assert!(snapshot.get("grants_2025-02-18T232513.csv").unwrap().updated_at.is_some());
        assert!(snapshot.get("readme.txt").unwrap().updated_at.is_none());
    }

    #[test]
    fn test_project_with_no_files_is_an_empty_snapshot() {
        let body = r#"{"data": {"node": {"id": "x", "name": "new", "files": []}}}"#;
        assert!(parse_project_files(PROJECT, body).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_project_is_archive_list_error() {
        let body = r#"{"data": {"node": null}}"#;
        let err = parse_project_files(PROJECT, body).unwrap_err();
        assert!(matches!(err, SyncError::ArchiveList { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_graphql_errors_are_archive_list_error() {
        let body = r#"{"data": null, "errors": [{"message": "Signature has expired"}]}"#;
        match parse_project_files(PROJECT, body).unwrap_err() {
            SyncError::ArchiveList { reason, .. } => assert_eq!(reason, "Signature has expired"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_upload_uri() {
        let body = r#"{"data": {"createFileUploadUri": {
            "ok": {"name": "a_2025-02-18T232513.csv", "uri": "https://storage.example/signed?sig=abc"},
            "err": null
        }}}"#;
        assert_eq!(
            parse_upload_uri("a_2025-02-18T232513.csv", body).unwrap(),
            "https://storage.example/signed?sig=abc"
        );
    }

    #[test]
    fn test_upload_uri_err_field_is_upload_error() {
        let body = r#"{"data": {"createFileUploadUri": {"ok": null, "err": "permission denied"}}}"#;
        match parse_upload_uri("a.csv", body).unwrap_err() {
            SyncError::Upload { name, reason } => {
                assert_eq!(name, "a.csv");
                assert_eq!(reason, "permission denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_updated_at_formats() {
        assert!(parse_updated_at("2025-02-19T01:02:03Z").is_some());
        assert!(parse_updated_at("2025-02-19T01:02:03.25").is_some());
        assert!(parse_updated_at("last tuesday").is_none());
    }

    #[tokio::test]
    async fn test_upload_requests_uri_then_puts_file() {
        let server = StubServer::start(upload_handler(200)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_2025-02-18T232513.csv");
        std::fs::write(&path, b"id,amount\n1,20\n").unwrap();

        bln_client(&server).upload_file(PROJECT, &path).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 2);

        let mutation = &requests[0];
        assert_eq!(mutation.method, "POST");
        assert_eq!(mutation.header("authorization"), Some("JWT tok"));
        let sent: Value = serde_json::from_slice(&mutation.body).unwrap();
        assert!(sent["query"].as_str().unwrap().contains("createFileUploadUri"));
        assert_eq!(sent["variables"]["input"]["projectId"], PROJECT);
        assert_eq!(sent["variables"]["input"]["fileName"], "a_2025-02-18T232513.csv");

        let put = &requests[1];
        assert_eq!(put.method, "PUT");
        assert_eq!(put.query("sig"), Some("abc"));
        assert_eq!(put.header("content-type"), Some("application/octet-stream"));
        assert_eq!(put.body, b"id,amount\n1,20\n");
    }

    #[tokio::test]
    async fn test_upload_streams_files_larger_than_one_chunk() {
        let server = StubServer::start(upload_handler(200)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big_2025-02-18T232513.csv");
        let contents: Vec<u8> = (0..UPLOAD_CHUNK * 2 + 17).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &contents).unwrap();

        bln_client(&server).upload_file(PROJECT, &path).await.unwrap();

        let put = &server.requests()[1];
        assert_eq!(put.header("content-length"), Some(contents.len().to_string().as_str()));
        assert_eq!(put.body, contents);
    }

    #[tokio::test]
    async fn test_storage_rejection_is_upload_error() {
        let server = StubServer::start(upload_handler(403)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_2025-02-18T232513.csv");
        std::fs::write(&path, b"x").unwrap();

        let err = bln_client(&server).upload_file(PROJECT, &path).await.unwrap_err();
        match err {
            SyncError::Upload { name, reason } => {
                assert_eq!(name, "a_2025-02-18T232513.csv");
                assert!(reason.contains("403"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_listing_over_http() {
        let server = StubServer::start(|req| {
            let sent: Value = serde_json::from_slice(&req.body).ok()?;
            if sent["variables"]["id"] != PROJECT {
                return Some((404, "{}".to_string()));
            }
            Some((
                200,
                r#"{"data": {"node": {"id": "x", "name": "DOGE", "files": [{"name": "a.csv"}]}}}"#
                    .to_string(),
            ))
        })
        .await;

        let snapshot = bln_client(&server).list_archived_files(PROJECT).await.unwrap();
        assert!(snapshot.contains("a.csv"));
        assert_eq!(server.requests()[0].header("authorization"), Some("JWT tok"));
    }

    #[tokio::test]
    async fn test_listing_server_error_is_archive_list_error() {
        let server = StubServer::start(|_| Some((502, "Bad Gateway".to_string()))).await;

        let err = bln_client(&server).list_archived_files(PROJECT).await.unwrap_err();
        match &err {
            SyncError::ArchiveList { reason, .. } => assert!(reason.contains("502"), "{}", reason),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_fatal());
    }
}
