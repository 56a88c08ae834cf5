use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// One entry of `installed_mods.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModRecord {
    pub filename: String,
    pub url: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
}

/// Mods installed from the catalog, keyed by project id.
///
/// Every mutation is written through to disk. There is no file locking;
/// the launcher is the only writer.
#[derive(Debug, Clone)]
pub struct InstalledModsRegistry {
    path: PathBuf,
    entries: BTreeMap<String, InstalledModRecord>,
}

impl InstalledModsRegistry {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the registry; a missing or corrupt file is an empty registry.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::empty(path),
            Err(e) => {
                error!("Error reading {:?}: {}", path, e);
                return Self::empty(path);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Self { path, entries },
            Err(e) => {
                error!("Error parsing {:?}: {}", path, e);
                Self::empty(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `entries`; callers commit them to memory only once this succeeds.
    async fn save(&self, entries: &BTreeMap<String, InstalledModRecord>) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| LauncherError::io(&self.path, e))
    }

    pub async fn add(&mut self, project_id: &str, record: InstalledModRecord) -> LauncherResult<()> {
        let mut entries = self.entries.clone();
        entries.insert(project_id.to_string(), record);
        self.save(&entries).await?;
        self.entries = entries;
        info!("Mod {} added to installed mods", project_id);
        Ok(())
    }

    /// Drop `project_id`; returns the removed record, if any.
    pub async fn remove(&mut self, project_id: &str) -> LauncherResult<Option<InstalledModRecord>> {
        let mut entries = self.entries.clone();
        let removed = entries.remove(project_id);
        if removed.is_some() {
            self.save(&entries).await?;
            self.entries = entries;
            info!("Mod {} removed from installed mods", project_id);
        } else {
            warn!("Mod {} was not in installed mods", project_id);
        }
        Ok(removed)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.entries.contains_key(project_id)
    }

    pub fn get(&self, project_id: &str) -> Option<&InstalledModRecord> {
        self.entries.get(project_id)
    }

    pub fn by_filename(&self, filename: &str) -> Option<&InstalledModRecord> {
        self.entries.values().find(|r| r.filename == filename)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InstalledModRecord)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
