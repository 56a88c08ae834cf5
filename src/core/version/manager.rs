use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::naming::{get_base_version, latest_per_game_version, version_key, version_type};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::library::{GameLibrary, InstalledVersion};
use crate::core::loaders::LoaderType;
use crate::core::paths::versions_dir;

/// Installed versions sharing one base game version, as shown in the
/// version manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledGroup {
    pub base_version: String,
    pub loaders: Vec<LoaderType>,
    pub version_ids: Vec<String>,
}

#[derive(Deserialize)]
struct VersionHeader {
    id: Option<String>,
    #[serde(rename = "type", default)]
    version_type: String,
}

/// Read `versions/<id>/<id>.json` headers, the way the external library
/// builds its installed-versions listing.
pub async fn scan_installed(game_dir: &Path) -> LauncherResult<Vec<InstalledVersion>> {
    let mut versions = Vec::new();
    for name in version_dir_names(game_dir).await? {
        let json_path = versions_dir(game_dir).join(&name).join(format!("{name}.json"));
        let raw = match tokio::fs::read_to_string(&json_path).await {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        match serde_json::from_str::<VersionHeader>(&raw) {
            Ok(header) => versions.push(InstalledVersion {
                id: header.id.unwrap_or(name),
                version_type: header.version_type,
            }),
            Err(e) => warn!("Corrupt version json {:?}: {}", json_path, e),
        }
    }
    Ok(versions)
}

/// Selectable versions for `loader`; Forge builds collapse to the latest
/// build per game version.
pub async fn available_versions(
    library: &dyn GameLibrary,
    loader: LoaderType,
) -> LauncherResult<Vec<String>> {
    let raw = library.available_versions(loader).await?;
    info!("Loaded {} {} versions", raw.len(), loader);
    Ok(selectable_versions(loader, raw))
}

/// Collapse a raw listing into what the version picker shows.
pub fn selectable_versions(loader: LoaderType, raw: Vec<String>) -> Vec<String> {
    match loader {
        LoaderType::Forge => latest_per_game_version(&raw),
        LoaderType::Vanilla | LoaderType::Fabric => raw,
    }
}

/// Label for a selectable version: loader ids show only their game version.
pub fn display_name(loader: LoaderType, version_id: &str) -> &str {
    match loader {
        LoaderType::Vanilla => version_id,
        LoaderType::Forge | LoaderType::Fabric => {
            version_id.split('-').next().unwrap_or(version_id)
        }
    }
}

/// Names of the directories under `versions/`.
pub async fn version_dir_names(game_dir: &Path) -> LauncherResult<BTreeSet<String>> {
    let dir = versions_dir(game_dir);
    let mut names = BTreeSet::new();

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(LauncherError::io(&dir, e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LauncherError::io(&dir, e))?
    {
        if entry.path().is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Blocking twin of [`version_dir_names`] for use in `Drop`.
pub fn version_dir_names_blocking(game_dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(versions_dir(game_dir))
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_dir())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Group installed ids by base version, newest base version first.
pub fn group_installed(ids: &[String]) -> Vec<InstalledGroup> {
    let mut groups: BTreeMap<String, InstalledGroup> = BTreeMap::new();

    for id in ids {
        let base = get_base_version(id);
        let group = groups.entry(base.clone()).or_insert_with(|| InstalledGroup {
            base_version: base,
            loaders: Vec::new(),
            version_ids: Vec::new(),
        });
        let loader = version_type(id);
        if !group.loaders.contains(&loader) {
            group.loaders.push(loader);
        }
        group.version_ids.push(id.clone());
    }

    let mut groups: Vec<_> = groups.into_values().collect();
    groups.sort_by(|a, b| version_key(&b.base_version).cmp(&version_key(&a.base_version)));
    groups
}

pub fn version_path(game_dir: &Path, version_id: &str) -> PathBuf {
    versions_dir(game_dir).join(version_id)
}

/// Remove `versions/<id>` entirely.
pub async fn delete_version(game_dir: &Path, version_id: &str) -> LauncherResult<()> {
    let path = version_path(game_dir, version_id);
    if !path.is_dir() {
        return Err(LauncherError::VersionNotFound(version_id.to_string()));
    }

    tokio::fs::remove_dir_all(&path)
        .await
        .map_err(|e| LauncherError::io(&path, e))?;

    info!("Deleted version {}", version_id);
    Ok(())
}

/// Total size in bytes of everything below `path`.
pub async fn directory_size(path: &Path) -> LauncherResult<u64> {
    let mut total = 0;
    let mut pending = vec![path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(LauncherError::io(&dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&dir, e))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| LauncherError::io(entry.path(), e))?;
            if metadata.is_dir() {
                pending.push(entry.path());
            } else {
                total += metadata.len();
            }
        }
    }

    Ok(total)
}

/// Compute the size of one version directory on a background task.
pub fn spawn_size_scan(
    game_dir: &Path,
    version_id: &str,
) -> tokio::task::JoinHandle<LauncherResult<u64>> {
    let path = version_path(game_dir, version_id);
    tokio::spawn(async move { directory_size(&path).await })
}
