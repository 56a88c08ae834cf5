use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::PROFILES_FILE;

const DEFAULT_ICON: &str = "Furnace";
const PROFILE_TYPE: &str = "custom";
const LEDGER_FORMAT_VERSION: u32 = 2;

/// One launch profile as the external launcher library expects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub created: String,
    pub icon: String,
    pub last_used: String,
    pub last_version_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    pub locale: String,
    pub enable_snapshots: bool,
    pub enable_advanced: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            locale: "ru_ru".to_string(),
            enable_snapshots: true,
            enable_advanced: false,
        }
    }
}

/// `launcher_profiles.json`. The layout is dictated by the external library;
/// fields this crate does not model are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLedger {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<String>,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub client_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileLedger {
    fn empty(client_token: &str) -> LauncherResult<Self> {
        Ok(Self {
            profiles: BTreeMap::new(),
            selected_profile: None,
            settings: serde_json::to_value(LedgerSettings::default())?,
            version: LEDGER_FORMAT_VERSION,
            client_token: client_token.to_string(),
            extra: Map::new(),
        })
    }

    pub fn selected(&self) -> Option<&Profile> {
        self.selected_profile
            .as_ref()
            .and_then(|id| self.profiles.get(id))
    }
}

pub fn ledger_path(game_dir: &Path) -> PathBuf {
    game_dir.join(PROFILES_FILE)
}

/// Create the ledger with an empty profile map unless it already exists.
pub async fn ensure_initialized(game_dir: &Path, client_token: &str) -> LauncherResult<()> {
    let path = ledger_path(game_dir);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(());
    }

    tokio::fs::create_dir_all(game_dir)
        .await
        .map_err(|e| LauncherError::io(game_dir, e))?;
    write_ledger(&path, &ProfileLedger::empty(client_token)?).await?;

    info!("Created {:?}", path);
    Ok(())
}

pub async fn read_ledger(game_dir: &Path) -> LauncherResult<ProfileLedger> {
    let path = ledger_path(game_dir);
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| LauncherError::io(&path, e))?;
    Ok(serde_json::from_str(&json)?)
}

/// Insert a new profile for `version_id`, select it and rewrite the ledger.
///
/// Returns the new profile id, or `None` when the ledger does not exist.
pub async fn add_profile(
    game_dir: &Path,
    version_id: &str,
    name: &str,
) -> LauncherResult<Option<String>> {
    let path = ledger_path(game_dir);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        warn!("{:?} not found, cannot add profile '{}'", path, name);
        return Ok(None);
    }

    let mut ledger = read_ledger(game_dir).await?;

    let profile_id = Uuid::new_v4().simple().to_string();
    let now = Utc::now().to_rfc3339();
    ledger.profiles.insert(
        profile_id.clone(),
        Profile {
            created: now.clone(),
            icon: DEFAULT_ICON.to_string(),
            last_used: now,
            last_version_id: version_id.to_string(),
            name: name.to_string(),
            profile_type: PROFILE_TYPE.to_string(),
            extra: Map::new(),
        },
    );
    ledger.selected_profile = Some(profile_id.clone());

    write_ledger(&path, &ledger).await?;

    info!("Profile '{}' added for {}", name, version_id);
    Ok(Some(profile_id))
}

async fn write_ledger(path: &Path, ledger: &ProfileLedger) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_initialized_creates_empty_ledger_once() {
        let dir = tempfile::tempdir().unwrap();

        ensure_initialized(dir.path(), "token-1").await.unwrap();
        let ledger = read_ledger(dir.path()).await.unwrap();
        assert!(ledger.profiles.is_empty());
        assert_eq!(ledger.version, 2);
        assert_eq!(ledger.client_token, "token-1");
        assert_eq!(ledger.settings["locale"], "ru_ru");

        // A second call must not reset the file.
        add_profile(dir.path(), "1.20.1", "1.20.1").await.unwrap();
        ensure_initialized(dir.path(), "token-2").await.unwrap();
        let ledger = read_ledger(dir.path()).await.unwrap();
        assert_eq!(ledger.profiles.len(), 1);
        assert_eq!(ledger.client_token, "token-1");
    }

    #[tokio::test]
    async fn add_profile_selects_new_entry() {
        let dir = tempfile::tempdir().unwrap();
        ensure_initialized(dir.path(), "tok").await.unwrap();

        let first = add_profile(dir.path(), "1.20.1", "1.20.1").await.unwrap().unwrap();
        let second = add_profile(dir.path(), "fabric-loader-0.15.7-1.20.1", "1.20.1 Fabric")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(first, second);

        let ledger = read_ledger(dir.path()).await.unwrap();
        assert_eq!(ledger.profiles.len(), 2);
        let selected = ledger.selected().unwrap();
        assert_eq!(selected.last_version_id, "fabric-loader-0.15.7-1.20.1");
        assert_eq!(selected.name, "1.20.1 Fabric");
        assert_eq!(selected.icon, "Furnace");
        assert_eq!(selected.profile_type, "custom");
        assert!(chrono::DateTime::parse_from_rfc3339(&selected.created).is_ok());
    }

    #[tokio::test]
    async fn add_profile_without_ledger_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let id = add_profile(dir.path(), "1.20.1", "1.20.1").await.unwrap();
        assert!(id.is_none());
        assert!(!ledger_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn foreign_fields_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            ledger_path(dir.path()),
            r#"{
                "profiles": {
                    "abc": {"name": "Old", "lastVersionId": "1.19.4", "javaArgs": "-Xmx2G"}
                },
                "settings": {"locale": "en_us"},
                "version": 3,
                "clientToken": "x",
                "authenticationDatabase": {"k": 1}
            }"#,
        )
        .unwrap();

        add_profile(dir.path(), "1.20.1", "1.20.1").await.unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(ledger_path(dir.path())).unwrap())
                .unwrap();
        assert_eq!(raw["authenticationDatabase"]["k"], 1);
        assert_eq!(raw["profiles"]["abc"]["javaArgs"], "-Xmx2G");
        assert_eq!(raw["settings"]["locale"], "en_us");
        assert_eq!(raw["version"], 3);
    }
}
