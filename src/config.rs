//! Run settings.
//!
//! Everything a run needs is gathered once in `main` into a [`Settings`]
//! value and handed to each component; nothing reads configuration from
//! globals afterwards. Credentials come from a per-environment dotenv file,
//! `.env.test` or `.env.prod`, so test runs post to test channels and
//! write to a test project.

use crate::error::{Result, SyncError};
use crate::source::ListingMode;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default GraphQL endpoint of the Big Local News platform.
pub const DEFAULT_BLN_API_URL: &str = "https://api.biglocalnews.org/graphql";

/// Variables that must be present and non-blank in the environment file.
pub const REQUIRED_VARS: [&str; 4] = [
    "BLN_API_TOKEN",
    "BLN_PROJECT_ID",
    "SLACK_ERROR_TOKEN",
    "SLACK_ERROR_CHANNEL_ID",
];

/// Deployment environment, chosen by the single positional CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Path of this environment's dotenv file inside `dir`.
    pub fn env_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!(".env.{}", self.as_str()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the watched folder lives and how to list it.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub owner: String,
    pub repo: String,
    /// Repository-relative folder; empty for the repository root.
    pub folder: String,
    pub git_ref: String,
    pub listing: ListingMode,
    pub api_base: String,
    pub web_base: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub api_url: String,
    pub api_token: String,
    pub project_id: String,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub slack_token: String,
    pub channel_id: String,
    /// Prefix identifying this tool in every alert.
    pub script_name: String,
}

#[derive(Debug, Clone)]
pub struct TransferSettings {
    /// Local pass-through cache of downloaded revisions.
    pub cache_dir: PathBuf,
    /// Pause between consecutive transfers.
    pub pause: Duration,
}

/// Complete settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub source: SourceSettings,
    pub archive: ArchiveSettings,
    pub alerts: AlertSettings,
    pub transfer: TransferSettings,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

/// Credentials and endpoints read from the environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secrets {
    pub bln_api_token: String,
    pub bln_project_id: String,
    pub slack_token: String,
    pub slack_channel_id: String,
    pub github_token: Option<String>,
    pub bln_api_url: String,
}

impl Secrets {
    /// Reads secrets through `lookup`, failing on the first required
    /// variable that is missing or blank.
    ///
    /// # Arguments
    ///
    /// * `origin` - The file the values were expected in, for error messages.
    /// * `lookup` - Returns the value of a variable, if set.
    pub fn from_lookup<F>(origin: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            non_blank(key).ok_or_else(|| {
                SyncError::Config(format!(
                    "required variable {} is missing or empty in {}",
                    key,
                    origin.display()
                ))
            })
        };

        Ok(Secrets {
            bln_api_token: required(REQUIRED_VARS[0])?,
            bln_project_id: required(REQUIRED_VARS[1])?,
            slack_token: required(REQUIRED_VARS[2])?,
            slack_channel_id: required(REQUIRED_VARS[3])?,
            github_token: non_blank("GITHUB_TOKEN"),
            bln_api_url: non_blank("BLN_API_URL")
                .unwrap_or_else(|| DEFAULT_BLN_API_URL.to_string()),
        })
    }

    /// Loads `<dir>/.env.<environment>` into the process environment and
    /// reads the secrets from it.
    ///
    /// Values from the file replace any already set in the process
    /// environment, so a shell left holding production credentials cannot
    /// redirect a test run. A missing file is only a warning; the
    /// required-variable check decides whether the run can go ahead.
    pub fn load(environment: Environment, dir: &Path) -> Result<Self> {
        let path = environment.env_file(dir);
        info!("Loading environment from {}", path.display());
        match apply_env_file(&path) {
            Ok(count) => debug!("Applied {} variables from {}", count, path.display()),
            Err(e) => warn!("Could not load {}: {}", path.display(), e),
        }
        let secrets = Secrets::from_lookup(&path, |key| std::env::var(key).ok())?;
        info!("{} successfully loaded", path.display());
        Ok(secrets)
    }
}

/// Sets every variable in the dotenv file at `path`, overriding existing
/// values. Returns how many were set.
fn apply_env_file(path: &Path) -> std::result::Result<usize, dotenv::Error> {
    let mut count = 0;
    for item in dotenv::from_path_iter(path)? {
        let (key, value) = item?;
        std::env::set_var(key, value);
        count += 1;
    }
    Ok(count)
}
