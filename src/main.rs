//! BLN GitHub Sync: Archive New Revisions of a GitHub Folder into Big Local News
//!
//! This application looks for new data in a GitHub repository folder (by
//! default <https://github.com/m-nolan/doge-scrape/tree/main/data>) and uploads
//! every file revision that is missing from a Big Local News project.
//!
//! ## Design Overview
//! - **Source**: Lists the folder and each file's commit history through the
//!   GitHub API, naming every revision `<stem>_<commit timestamp>.<ext>`.
//! - **Archive**: Lists the project's files through the BLN GraphQL API.
//! - **Reconcile**: Selects the revisions whose name the archive lacks.
//! - **Transfer**: Downloads each into a local cache and uploads it, pausing
//!   between files.
//!
//! ## Usage
//! 1. Create `.env.test` and/or `.env.prod` next to where the tool runs:
//!    ```env
//!    BLN_API_TOKEN=...
//!    BLN_PROJECT_ID=...
//!    SLACK_ERROR_TOKEN=...
//!    SLACK_ERROR_CHANNEL_ID=...
//!    # optional
//!    GITHUB_TOKEN=...
//!    ```
//! 2. Run against the chosen environment:
//!    ```sh
//!    cargo run -- test
//!    cargo run -- prod --owner m-nolan --repo doge-scrape --folder data
//!    ```
//! 3. Logs go to the console, controlled by `RUST_LOG` (default `info`).
//!
//! ## Exit Status
//! `0` when the run completes, whether or not anything new was found. A
//! non-zero status means a fatal error: bad configuration, an unreadable
//! folder listing, or an unavailable archive listing.

use anyhow::{Context, Result};
use bln_github_sync::alert::SlackAlert;
use bln_github_sync::archive::BlnClient;
use bln_github_sync::config::{
    AlertSettings, ArchiveSettings, Environment, Secrets, Settings, SourceSettings,
    TransferSettings,
};
use bln_github_sync::run::run_sync;
use bln_github_sync::source::{GitHubSource, ListingMode};
use bln_github_sync::utils::build_client;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for a sync run.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Environment to run in; selects `.env.test` or `.env.prod`.
    #[clap(value_enum)]
    environment: Environment,

    /// Owner of the source GitHub repository.
    #[clap(long, env = "SOURCE_OWNER", default_value = "m-nolan")]
    owner: String,

    /// Name of the source GitHub repository.
    #[clap(long, env = "SOURCE_REPO", default_value = "doge-scrape")]
    repo: String,

    /// Folder inside the repository to watch.
    #[clap(long, env = "SOURCE_FOLDER", default_value = "data")]
    folder: String,

    /// Branch, tag or commit whose history is followed.
    #[clap(long = "ref", env = "SOURCE_REF", default_value = "main")]
    git_ref: String,

    /// How to list the folder: the REST contents API or the HTML page's embedded data.
    #[clap(long, value_enum, env = "SOURCE_LISTING", default_value = "api")]
    listing: ListingMode,

    /// Base URL of the GitHub REST API.
    #[clap(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_url: String,

    /// Base URL of the GitHub web frontend (folder pages and raw content).
    #[clap(long, env = "GITHUB_WEB_URL", default_value = "https://github.com")]
    github_web_url: String,

    /// Local cache directory for downloaded revisions.
    #[clap(long, env = "CACHE_DIR", default_value = "data")]
    cache_dir: PathBuf,

    /// Pause between transfers, in milliseconds.
    #[clap(long, env = "PAUSE_MS", default_value_t = 1000)]
    pause_ms: u64,

    /// Timeout for each HTTP request, in seconds.
    #[clap(long, env = "TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Directory holding the `.env.<environment>` files.
    #[clap(long, env = "ENV_DIR", default_value = ".")]
    env_dir: PathBuf,
}

/// Assembles the run settings from the CLI arguments and the environment file.
fn build_settings(args: Args, secrets: Secrets) -> Settings {
    Settings {
        environment: args.environment,
        source: SourceSettings {
            owner: args.owner,
            repo: args.repo,
            folder: args.folder,
            git_ref: args.git_ref,
            listing: args.listing,
            api_base: args.github_api_url,
            web_base: args.github_web_url,
            token: secrets.github_token,
        },
        archive: ArchiveSettings {
            api_url: secrets.bln_api_url,
            api_token: secrets.bln_api_token,
            project_id: secrets.bln_project_id,
        },
        alerts: AlertSettings {
            slack_token: secrets.slack_token,
            channel_id: secrets.slack_channel_id,
            script_name: env!("CARGO_PKG_NAME").to_string(),
        },
        transfer: TransferSettings {
            cache_dir: args.cache_dir,
            pause: Duration::from_millis(args.pause_ms),
        },
        request_timeout: Duration::from_secs(args.timeout_secs),
    }
}

/// Loads configuration, wires up the clients and runs one sync.
///
/// # Returns
/// - `Ok(())` if the run completed, with or without new files.
/// - `Err(anyhow::Error)` on a fatal error, which gives a non-zero exit status.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let secrets = Secrets::load(args.environment, &args.env_dir)
        .context("Failed to load environment configuration")?;
    let settings = build_settings(args, secrets);
    info!(
        "Running sync in {} environment against project {}",
        settings.environment, settings.archive.project_id
    );

    let client = build_client(settings.request_timeout).context("Failed to build HTTP client")?;
    let source = GitHubSource::new(client.clone(), &settings.source);
    let archive = BlnClient::new(client.clone(), &settings.archive);
    let alerts = SlackAlert::new(client, &settings.alerts);

    let summary = run_sync(
        &settings.archive.project_id,
        &settings.transfer,
        &source,
        &archive,
        &alerts,
    )
    .await
    .context("Sync run failed")?;

    info!("Done: {}", summary);
    Ok(())
}
