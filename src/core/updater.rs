// ─── Self-update ───
// Checks the project's latest published release and fetches its executable
// next to the running one as `<asset>.new`. Swapping the files is left to
// the shell.

use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::API_TIMEOUT;

pub const APP_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_ASSET: &str = "HruHruLauncher.exe";

const RELEASES_API_URL: &str =
    "https://api.github.com/repos/krutoychel24/hru-hru-launcher/releases/latest";
const RELEASES_DOWNLOAD_URL: &str =
    "https://github.com/krutoychel24/hru-hru-launcher/releases/download";

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
}

/// A newer release than the running build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub tag: String,
    pub notes: String,
}

#[derive(Clone)]
pub struct Updater {
    client: Client,
    api_url: String,
    download_base: String,
    downloader: Downloader,
}

impl Updater {
    pub fn new(client: Client) -> Self {
        Self::with_urls(client, RELEASES_API_URL, RELEASES_DOWNLOAD_URL)
    }

    pub fn with_urls(
        client: Client,
        api_url: impl Into<String>,
        download_base: impl Into<String>,
    ) -> Self {
        Self {
            downloader: Downloader::new(client.clone()),
            client,
            api_url: api_url.into(),
            download_base: download_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// The latest release when its tag differs (ignoring case) from `current`.
    pub async fn check_for_update(&self, current: &str) -> LauncherResult<Option<Release>> {
        debug!("Checking for updates at {}", self.api_url);
        let latest: LatestRelease = self
            .client
            .get(&self.api_url)
            .timeout(API_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if latest.tag_name.eq_ignore_ascii_case(current) {
            debug!("Launcher is up to date ({})", current);
            return Ok(None);
        }

        info!("Update available: {} -> {}", current, latest.tag_name);
        Ok(Some(Release {
            tag: latest.tag_name,
            notes: latest.body.unwrap_or_default(),
        }))
    }

    pub fn download_url(&self, tag: &str, asset: &str) -> String {
        format!("{}/{}/{}", self.download_base, tag, asset)
    }

    /// Download `asset` of release `tag` into `dest_dir` as `<asset>.new`.
    pub async fn download_update(
        &self,
        tag: &str,
        asset: &str,
        dest_dir: &Path,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> LauncherResult<PathBuf> {
        let dest = dest_dir.join(format!("{asset}.new"));
        self.downloader
            .download_file(&self.download_url(tag, asset), &dest, None, cancel, on_progress)
            .await?;
        info!("Update {} downloaded to {:?}", tag, dest);
        Ok(dest)
    }
}

/// Directory of the running executable.
pub fn install_dir() -> LauncherResult<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| LauncherError::io("current_exe", e))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| LauncherError::Other(format!("No parent directory for {exe:?}")))
}
