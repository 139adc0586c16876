use super::lister::SourceRepository;
use super::listing::{parse_commits, parse_contents_listing, parse_embedded_listing, ListingMode};
use super::types::Revision;
use crate::config::SourceSettings;
use crate::error::{Result, SyncError};
use crate::utils::{join_path, normalize_url};
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use reqwest::{Client, RequestBuilder};
use std::collections::BTreeSet;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// GitHub caps `per_page` at 100 for the commits endpoint.
const COMMITS_PER_PAGE: usize = 100;

/// A folder in a GitHub repository, read through the REST API and the
/// raw-content endpoint.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_base: String,
    web_base: String,
    owner: String,
    repo: String,
    folder: String,
    git_ref: String,
    token: Option<String>,
    listing: ListingMode,
}

impl GitHubSource {
    /// Creates a source over `settings`, sending every request through `client`.
    pub fn new(client: Client, settings: &SourceSettings) -> Self {
        GitHubSource {
            client,
            api_base: normalize_url(&settings.api_base),
            web_base: normalize_url(&settings.web_base),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            folder: settings.folder.trim_matches('/').to_string(),
            git_ref: settings.git_ref.clone(),
            token: settings.token.clone(),
            listing: settings.listing,
        }
    }

    /// Repository-relative path of a file in the watched folder.
    fn file_path(&self, base_name: &str) -> String {
        join_path(&[&self.folder, base_name])
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, self.folder
        )
    }

    fn tree_url(&self) -> String {
        format!(
            "{}/{}",
            self.web_base,
            join_path(&[&self.owner, &self.repo, "tree", &self.git_ref, &self.folder])
        )
    }

    fn commits_url(&self) -> String {
        format!("{}/repos/{}/{}/commits", self.api_base, self.owner, self.repo)
    }

    /// A GET against the REST API, with the JSON media type and the token
    /// if one is configured.
    fn api_get(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {}", token)),
            None => request,
        }
    }

    /// Sends a folder-listing request and returns its body. Any failure here
    /// is fatal to the run.
    async fn listing_body(&self, request: RequestBuilder, url: &str) -> Result<String> {
        let listing_err = |reason: String| SyncError::Listing {
            url: url.to_string(),
            reason,
        };
        let resp = request
            .send()
            .await
            .map_err(|e| listing_err(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(listing_err(format!("server returned {}", status)));
        }
        resp.text().await.map_err(|e| listing_err(e.to_string()))
    }
}

#[async_trait]
impl SourceRepository for GitHubSource {
    fn label(&self) -> String {
        format!("{}/{}/{}@{}", self.owner, self.repo, self.folder, self.git_ref)
    }

    async fn list_files(&self) -> Result<BTreeSet<String>> {
        match self.listing {
            ListingMode::Api => {
                let url = self.contents_url();
                info!("Listing folder through {}", url);
                let request = self.api_get(&url).query(&[("ref", self.git_ref.as_str())]);
                let body = self.listing_body(request, &url).await?;
                parse_contents_listing(&url, &body)
            }
            ListingMode::Html => {
                let url = self.tree_url();
                info!("Listing folder through {}", url);
                let body = self.listing_body(self.client.get(&url), &url).await?;
                parse_embedded_listing(&url, &body)
            }
        }
    }

    async fn list_revisions(&self, base_name: &str) -> Result<Vec<Revision>> {
        let path = self.file_path(base_name);
        let url = self.commits_url();
        let fetch_err = |reason: String| SyncError::Fetch {
            target: path.clone(),
            reason,
        };

        let mut revisions = Vec::new();
        let mut page = 1usize;
        loop {
            let resp = self
                .api_get(&url)
                .query(&[("path", path.as_str()), ("sha", self.git_ref.as_str())])
                .query(&[("per_page", COMMITS_PER_PAGE), ("page", page)])
                .send()
                .await
                .map_err(|e| fetch_err(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(fetch_err(format!("commit history returned {}", status)));
            }
            let body = resp.text().await.map_err(|e| fetch_err(e.to_string()))?;
            let batch = parse_commits(&path, &body)?;
            let batch_len = batch.len();
            revisions.extend(batch);
            debug!("{}: page {} had {} commits", path, page, batch_len);

            if batch_len < COMMITS_PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(revisions)
    }

    fn raw_url(&self, revision_id: &str, base_name: &str) -> String {
        format!(
            "{}/{}",
            self.web_base,
            join_path(&[&self.owner, &self.repo, "raw", revision_id, &self.file_path(base_name)])
        )
    }

    async fn fetch_into(
        &self,
        location: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        let fetch_err = |reason: String| SyncError::Fetch {
            target: location.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("server returned {}", status)));
        }

        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_err(e.to_string()))?;
            sink.write_all(&chunk)
                .await
                .map_err(|e| fetch_err(format!("writing to cache: {}", e)))?;
            written += chunk.len() as u64;
        }
        sink.flush()
            .await
            .map_err(|e| fetch_err(format!("flushing cache: {}", e)))?;
        Ok(written)
    }
}
