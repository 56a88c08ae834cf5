use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use super::manifest::{read_metadata, ModMetadata};
use super::registry::InstalledModsRegistry;
use crate::core::catalog::ModrinthClient;

pub const DISABLED_SUFFIX: &str = ".disabled";

/// A mod archive found in the mods folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalMod {
    pub file_path: PathBuf,
    pub file_name: String,
    pub enabled: bool,
    #[serde(flatten)]
    pub metadata: ModMetadata,
    pub icon_url: Option<String>,
}

fn is_mod_archive(file_name: &str) -> bool {
    file_name.ends_with(".jar") || file_name.ends_with(".jar.disabled")
}

async fn archive_paths(mods_folder: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(mods_folder).await {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                error!("Cannot list {:?}: {}", mods_folder, e);
            }
            return Vec::new();
        }
    };

    let mut paths = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if is_mod_archive(&entry.file_name().to_string_lossy()) {
                    paths.push(entry.path());
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Error while listing {:?}: {}", mods_folder, e);
                break;
            }
        }
    }
    paths.sort();
    paths
}

/// Read every mod archive in `mods_folder`.
///
/// Registry records (matched by file name, ignoring the disabled suffix)
/// override the manifest's project id and game version. Mods with a
/// project id but no embedded icon get their icon URL from one bulk catalog
/// lookup. Unreadable archives are reported with fallback metadata.
pub async fn scan_local(
    catalog: &ModrinthClient,
    mods_folder: &Path,
    registry: &InstalledModsRegistry,
) -> Vec<LocalMod> {
    let paths = archive_paths(mods_folder).await;

    let read = tokio::task::spawn_blocking(move || {
        paths
            .into_iter()
            .map(|path| {
                let metadata = read_metadata(&path).unwrap_or_else(|e| {
                    warn!("Could not read metadata from {:?}: {}", path.file_name(), e);
                    ModMetadata::fallback(&path.file_name().unwrap_or_default().to_string_lossy())
                });
                (path, metadata)
            })
            .collect::<Vec<_>>()
    })
    .await;

    let read = match read {
        Ok(read) => read,
        Err(e) => {
            error!("Mod scan task failed: {}", e);
            return Vec::new();
        }
    };

    let mut mods: Vec<LocalMod> = read
        .into_iter()
        .map(|(file_path, mut metadata)| {
            let file_name = file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let enabled = !file_name.ends_with(DISABLED_SUFFIX);

            let registered = file_name.strip_suffix(DISABLED_SUFFIX).unwrap_or(&file_name);
            if let Some(record) = registry.by_filename(registered) {
                metadata.project_id = Some(record.project_id.clone());
                if let Some(game_version) = &record.game_version {
                    metadata.game_version = game_version.clone();
                }
            }

            LocalMod {
                file_path,
                file_name,
                enabled,
                metadata,
                icon_url: None,
            }
        })
        .collect();

    let missing_icons: Vec<String> = mods
        .iter()
        .filter(|m| m.metadata.icon_data.is_none())
        .filter_map(|m| m.metadata.project_id.clone())
        .collect();

    if !missing_icons.is_empty() {
        match catalog.get_projects(&missing_icons).await {
            Ok(projects) => {
                let icons: HashMap<String, Option<String>> = projects
                    .into_iter()
                    .map(|p| (p.id, p.icon_url))
                    .collect();
                for local in &mut mods {
                    if let Some(Some(url)) = local
                        .metadata
                        .project_id
                        .as_ref()
                        .and_then(|id| icons.get(id))
                    {
                        local.icon_url = Some(url.clone());
                    }
                }
            }
            Err(e) => error!("Failed to fetch bulk project details: {}", e),
        }
    }

    info!("Found {} mods in {:?}", mods.len(), mods_folder);
    mods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mods::registry::InstalledModRecord;
    use crate::core::test_support::{json, response, write_jar, CannedServer};

    fn fabric_manifest(id: &str, project_id: Option<&str>, icon: bool) -> String {
        let custom = project_id
            .map(|p| format!(r#","custom":{{"modrinth":{{"project_id":"{p}"}}}}"#))
            .unwrap_or_default();
        let icon = if icon { r#","icon":"icon.png""# } else { "" };
        format!(r#"{{"id":"{id}","name":"{id}","version":"1.0"{custom}{icon}}}"#)
    }

    async fn registry_with(dir: &Path, project_id: &str, filename: &str) -> InstalledModsRegistry {
        let mut registry = InstalledModsRegistry::empty(dir.join("installed_mods.json"));
        registry
            .add(
                project_id,
                InstalledModRecord {
                    filename: filename.into(),
                    url: format!("https://x/{filename}"),
                    project_id: project_id.into(),
                    game_version: Some("1.20.1".into()),
                },
            )
            .await
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn enabled_flag_and_registry_cross_reference() {
        let server = CannedServer::start(|_| {
            json(
                200,
                &serde_json::json!([
                    {"id": "AANobbMI", "icon_url": "https://cdn/sodium.png"},
                    {"id": "u6dRKJwZ", "icon_url": "https://cdn/jei.png"}
                ]),
            )
        })
        .await;
        let catalog = ModrinthClient::with_base_url(reqwest::Client::new(), server.base());

        let dir = tempfile::tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        std::fs::create_dir_all(&mods_dir).unwrap();
        write_jar(
            &mods_dir.join("sodium.jar"),
            &[("fabric.mod.json", fabric_manifest("sodium", Some("AANobbMI"), false).as_bytes())],
        );
        write_jar(
            &mods_dir.join("jei.jar.disabled"),
            &[("fabric.mod.json", fabric_manifest("jei", None, false).as_bytes())],
        );
        write_jar(
            &mods_dir.join("iconic.jar"),
            &[
                ("fabric.mod.json", fabric_manifest("iconic", Some("ICON0001"), true).as_bytes()),
                ("icon.png", b"png"),
            ],
        );
        std::fs::write(mods_dir.join("broken.jar"), b"garbage").unwrap();
        std::fs::write(mods_dir.join("notes.txt"), b"ignored").unwrap();

        let registry = registry_with(dir.path(), "u6dRKJwZ", "jei.jar").await;
        let mods = catalog.scan_local(&mods_dir, &registry).await;

        let names: Vec<_> = mods.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["broken.jar", "iconic.jar", "jei.jar.disabled", "sodium.jar"]);

        let broken = &mods[0];
        assert!(broken.enabled);
        assert_eq!(broken.metadata.name, "broken.jar");
        assert_eq!(broken.metadata.version, "Unknown");

        let jei = &mods[2];
        assert!(!jei.enabled);
        assert_eq!(jei.metadata.project_id.as_deref(), Some("u6dRKJwZ"));
        assert_eq!(jei.metadata.game_version, "1.20.1");
        assert_eq!(jei.icon_url.as_deref(), Some("https://cdn/jei.png"));

        let sodium = &mods[3];
        assert!(sodium.enabled);
        assert_eq!(sodium.icon_url.as_deref(), Some("https://cdn/sodium.png"));

        // Embedded icon: not part of the bulk lookup.
        assert!(mods[1].icon_url.is_none());
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].contains("ICON0001"));
    }

    #[tokio::test]
    async fn bulk_failure_leaves_icons_empty() {
        let server = CannedServer::start(|_| response(500, "text/plain", b"")).await;
        let catalog = ModrinthClient::with_base_url(reqwest::Client::new(), server.base());

        let dir = tempfile::tempdir().unwrap();
        write_jar(
            &dir.path().join("sodium.jar"),
            &[("fabric.mod.json", fabric_manifest("sodium", Some("AANobbMI"), false).as_bytes())],
        );
        let registry = InstalledModsRegistry::empty(dir.path().join("installed_mods.json"));

        let mods = catalog.scan_local(dir.path(), &registry).await;
        assert_eq!(mods.len(), 1);
        assert!(mods[0].icon_url.is_none());
    }

    #[tokio::test]
    async fn missing_folder_is_empty() {
        let catalog = ModrinthClient::with_base_url(reqwest::Client::new(), "http://127.0.0.1:9");
        let dir = tempfile::tempdir().unwrap();
        let registry = InstalledModsRegistry::empty(dir.path().join("installed_mods.json"));

        assert!(catalog
            .scan_local(&dir.path().join("mods"), &registry)
            .await
            .is_empty());
    }
}
