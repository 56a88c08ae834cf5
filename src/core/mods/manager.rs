use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::registry::{InstalledModRecord, InstalledModsRegistry};
use super::scan::DISABLED_SUFFIX;
use crate::core::catalog::ModrinthClient;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::LoaderType;

// ── Mod actions ─────────────────────────────────────────

/// Resolve the newest compatible version of `project_id`, download its
/// primary file into `mods_dir` and record it in the registry.
#[allow(clippy::too_many_arguments)]
pub async fn install_mod(
    catalog: &ModrinthClient,
    registry: &AsyncMutex<InstalledModsRegistry>,
    mods_dir: &Path,
    project_id: &str,
    game_version: &str,
    loader: LoaderType,
    cancel: &CancellationToken,
    progress: &mut (dyn FnMut(u8) + Send),
) -> LauncherResult<InstalledModRecord> {
    let version = catalog
        .get_latest_version(project_id, game_version, loader)
        .await
        .ok_or_else(|| LauncherError::NoCompatibleFile(project_id.to_string()))?;
    let file = version
        .primary_file()
        .ok_or_else(|| LauncherError::NoCompatibleFile(project_id.to_string()))?;

    if cancel.is_cancelled() {
        return Err(LauncherError::Cancelled);
    }

    info!("Downloading {} from {}", file.filename, file.url);
    catalog
        .downloader()
        .download_file(
            &file.url,
            &mods_dir.join(&file.filename),
            file.hashes.sha1.as_deref(),
            cancel,
            progress,
        )
        .await?;

    let record = InstalledModRecord {
        filename: file.filename.clone(),
        url: file.url.clone(),
        project_id: project_id.to_string(),
        game_version: Some(game_version.to_string()),
    };
    registry.lock().await.add(project_id, record.clone()).await?;
    Ok(record)
}

/// Delete the file of an installed mod and drop its registry entry.
///
/// A file that is already gone only warrants a warning and the entry is
/// still dropped. A file that exists but cannot be removed is an error, and
/// the entry stays.
pub async fn delete_mod(
    registry: &AsyncMutex<InstalledModsRegistry>,
    mods_dir: &Path,
    project_id: &str,
) -> LauncherResult<InstalledModRecord> {
    let mut registry = registry.lock().await;
    let record = registry
        .get(project_id)
        .cloned()
        .ok_or_else(|| LauncherError::ModNotInstalled(project_id.to_string()))?;

    let path = mods_dir.join(&record.filename);
    let disabled = mods_dir.join(format!("{}{}", record.filename, DISABLED_SUFFIX));
    let target = [path, disabled].into_iter().find(|p| p.exists());

    match target {
        Some(target) => match tokio::fs::remove_file(&target).await {
            Ok(()) => info!("Deleted mod file {:?}", target),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Mod file {:?} vanished before deletion", target)
            }
            Err(e) => {
                error!("Error deleting mod file {:?}: {}", target, e);
                return Err(LauncherError::io(&target, e));
            }
        },
        None => warn!(
            "Mod file {} not found, removing the entry anyway",
            record.filename
        ),
    }

    registry.remove(project_id).await?;
    Ok(record)
}

/// Enable or disable a mod archive by renaming `x.jar` ⇄ `x.jar.disabled`.
/// Returns the new path; an archive already in the wanted state is left as is.
pub async fn set_mod_enabled(path: &Path, enabled: bool) -> LauncherResult<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let new_name = match (enabled, name.strip_suffix(DISABLED_SUFFIX)) {
        (true, Some(stripped)) => stripped.to_string(),
        (false, None) => format!("{name}{DISABLED_SUFFIX}"),
        _ => return Ok(path.to_path_buf()),
    };

    let new_path = path.with_file_name(new_name);
    tokio::fs::rename(path, &new_path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    info!("Renamed {:?} -> {:?}", path, new_path);
    Ok(new_path)
}

// ── Background downloads ────────────────────────────────

/// Progress of background mod downloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModEvent {
    Progress {
        project_id: String,
        percent: u8,
    },
    Finished {
        project_id: String,
        success: bool,
        message: String,
    },
}

/// Runs one download task per project id.
///
/// A second request for an id that is still downloading is refused.
/// Downloads of different projects are independent and write to the shared
/// mods folder without coordination.
#[derive(Clone)]
pub struct DownloadManager {
    catalog: ModrinthClient,
    registry: Arc<AsyncMutex<InstalledModsRegistry>>,
    mods_dir: PathBuf,
    active: Arc<Mutex<HashMap<String, CancellationToken>>>,
    events: mpsc::UnboundedSender<ModEvent>,
}

impl DownloadManager {
    pub fn new(
        catalog: ModrinthClient,
        registry: Arc<AsyncMutex<InstalledModsRegistry>>,
        mods_dir: PathBuf,
        events: mpsc::UnboundedSender<ModEvent>,
    ) -> Self {
        Self {
            catalog,
            registry,
            mods_dir,
            active: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    fn active(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_active(&self, project_id: &str) -> bool {
        self.active().contains_key(project_id)
    }

    /// Cancel the download of `project_id`; false when none is running.
    pub fn cancel(&self, project_id: &str) -> bool {
        match self.active().get(project_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn start(
        &self,
        project_id: &str,
        game_version: &str,
        loader: LoaderType,
    ) -> LauncherResult<JoinHandle<()>> {
        let token = CancellationToken::new();
        {
            let mut active = self.active();
            if active.contains_key(project_id) {
                warn!("Download for {} is already running", project_id);
                return Err(LauncherError::DownloadInProgress(project_id.to_string()));
            }
            active.insert(project_id.to_string(), token.clone());
        }

        let manager = self.clone();
        let project_id = project_id.to_string();
        let game_version = game_version.to_string();

        Ok(tokio::spawn(async move {
            let _ = manager.events.send(ModEvent::Progress {
                project_id: project_id.clone(),
                percent: 0,
            });

            let events = manager.events.clone();
            let progress_id = project_id.clone();
            let mut on_progress = move |percent| {
                let _ = events.send(ModEvent::Progress {
                    project_id: progress_id.clone(),
                    percent,
                });
            };

            let result = install_mod(
                &manager.catalog,
                &manager.registry,
                &manager.mods_dir,
                &project_id,
                &game_version,
                loader,
                &token,
                &mut on_progress,
            )
            .await;

            manager.active().remove(&project_id);

            let (success, message) = match result {
                Ok(record) => (true, format!("Downloaded {}", record.filename)),
                Err(LauncherError::Cancelled) => {
                    (false, format!("Download of {project_id} cancelled"))
                }
                Err(e) => {
                    error!("Mod download {} failed: {}", project_id, e);
                    (false, format!("Could not download {project_id}: {e}"))
                }
            };
            let _ = manager.events.send(ModEvent::Finished {
                project_id,
                success,
                message,
            });
        }))
    }
}
