use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::DOWNLOAD_TIMEOUT;

/// Streaming file downloader.
///
/// Bodies are written chunk by chunk while a percentage is reported; a
/// failed, cancelled or mismatching download never leaves a partial file.
/// The response must start, and each chunk arrive, within `DOWNLOAD_TIMEOUT`.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` to `dest`, optionally validating SHA-1.
    ///
    /// `on_progress` receives whole percentages as they change (only when
    /// the server sends a length) and always a final `100` on success.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> LauncherResult<()> {
        let result = self
            .stream_to_file(url, dest, sha1_expected, cancel, on_progress)
            .await;

        if let Err(e) = &result {
            warn!("Download of {} failed: {}", url, e);
            if let Err(rm) = tokio::fs::remove_file(dest).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove partial file {:?}: {}", dest, rm);
                }
            }
        }
        result
    }

    async fn stream_to_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = tokio::time::timeout(DOWNLOAD_TIMEOUT, self.client.get(url).send())
            .await
            .map_err(|_| LauncherError::Other(format!("No response from {url}")))??;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length().filter(|len| *len > 0);
        let mut stream = response.bytes_stream();
        let mut hasher = Sha1::new();
        let mut downloaded: u64 = 0;
        let mut last_percent = None;

        // Scoped so the handle is closed before the file is removed or hashed.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;

            loop {
                let next = tokio::select! {
                    _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
                    next = tokio::time::timeout(DOWNLOAD_TIMEOUT, stream.next()) => next,
                };
                let Ok(chunk) = next else {
                    return Err(LauncherError::Other(format!(
                        "Download of {url} stalled for {}s",
                        DOWNLOAD_TIMEOUT.as_secs()
                    )));
                };
                let Some(chunk) = chunk else { break };
                let chunk = chunk?;

                file.write_all(&chunk)
                    .await
                    .map_err(|e| LauncherError::io(dest, e))?;
                hasher.update(&chunk);
                downloaded += chunk.len() as u64;

                if let Some(total) = total_bytes {
                    let percent = (downloaded.saturating_mul(100) / total).min(100) as u8;
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        on_progress(percent);
                    }
                }
            }

            file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
        }

        if let Some(total) = total_bytes {
            if downloaded < total {
                return Err(LauncherError::Other(format!(
                    "Download of {url} ended after {downloaded} of {total} bytes"
                )));
            }
        }

        if let Some(expected) = sha1_expected {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LauncherError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if last_percent != Some(100) {
            on_progress(100);
        }
        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, downloaded);
        Ok(())
    }
}
