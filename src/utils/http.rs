use crate::error::Result;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the source, archive and alert clients.
///
/// Every request made through the client carries `timeout`, so a stalled
/// server can't hang the run. GitHub rejects requests without a user agent.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Normalizes a base URL by stripping any trailing slashes.
///
/// # Examples
///
/// ```rust
/// use bln_github_sync::utils::normalize_url;
/// assert_eq!(normalize_url("https://api.github.com/"), "https://api.github.com");
/// assert_eq!(normalize_url("https://api.github.com"), "https://api.github.com");
/// ```
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Joins path segments with `/`, dropping empty segments and stray slashes.
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
