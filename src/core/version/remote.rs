// ─── Remote version lists ───
// The selectable-versions listings, fetched from the public metadata
// services: Mojang's version manifest, Fabric meta and the Forge Maven
// metadata. Installing any of them stays with the external library.

use std::cmp::Reverse;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::manager::selectable_versions;
use super::naming::version_key;
use crate::core::error::LauncherResult;
use crate::core::http::API_TIMEOUT;
use crate::core::loaders::LoaderType;

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";
pub const FORGE_METADATA_URL: &str =
    "https://maven.minecraftforge.net/net/minecraftforge/forge/maven-metadata.xml";

#[derive(Debug, Deserialize)]
struct VersionManifest {
    versions: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(rename = "type")]
    version_type: String,
}

#[derive(Debug, Deserialize)]
struct FabricGameVersion {
    version: String,
    #[serde(default)]
    stable: bool,
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: MavenVersioning,
}

#[derive(Debug, Deserialize)]
struct MavenVersioning {
    versions: MavenVersions,
}

#[derive(Debug, Deserialize)]
struct MavenVersions {
    #[serde(rename = "version", default)]
    version: Vec<String>,
}

/// Fetches raw version listings per loader.
#[derive(Clone)]
pub struct VersionLists {
    client: Client,
    manifest_url: String,
    fabric_meta: String,
    forge_metadata: String,
}

impl VersionLists {
    pub fn new(client: Client) -> Self {
        Self::with_urls(client, VERSION_MANIFEST_URL, FABRIC_META_BASE, FORGE_METADATA_URL)
    }

    pub fn with_urls(
        client: Client,
        manifest_url: impl Into<String>,
        fabric_meta: impl Into<String>,
        forge_metadata: impl Into<String>,
    ) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
            fabric_meta: fabric_meta.into().trim_end_matches('/').to_string(),
            forge_metadata: forge_metadata.into(),
        }
    }

    /// Raw listing for `loader`: vanilla releases, stable Fabric game
    /// versions, or every Forge `<game>-<build>` id, newest first.
    pub async fn raw(&self, loader: LoaderType) -> LauncherResult<Vec<String>> {
        match loader {
            LoaderType::Vanilla => self.vanilla_releases().await,
            LoaderType::Fabric => self.fabric_game_versions().await,
            LoaderType::Forge => self.forge_versions().await,
        }
    }

    /// Selectable versions for `loader`, with Forge collapsed to the latest
    /// build per game version.
    pub async fn available(&self, loader: LoaderType) -> LauncherResult<Vec<String>> {
        let raw = self.raw(loader).await?;
        info!("Loaded {} {} versions", raw.len(), loader);
        Ok(selectable_versions(loader, raw))
    }

    pub async fn vanilla_releases(&self) -> LauncherResult<Vec<String>> {
        debug!("Fetching version manifest from {}", self.manifest_url);
        let manifest: VersionManifest = self.get(&self.manifest_url).await?.json().await?;
        Ok(manifest
            .versions
            .into_iter()
            .filter(|v| v.version_type == "release")
            .map(|v| v.id)
            .collect())
    }

    pub async fn fabric_game_versions(&self) -> LauncherResult<Vec<String>> {
        let url = format!("{}/versions/game", self.fabric_meta);
        debug!("Fetching Fabric game versions from {}", url);
        let versions: Vec<FabricGameVersion> = self.get(&url).await?.json().await?;
        Ok(versions
            .into_iter()
            .filter(|v| v.stable)
            .map(|v| v.version)
            .collect())
    }

    pub async fn forge_versions(&self) -> LauncherResult<Vec<String>> {
        debug!("Fetching Forge metadata from {}", self.forge_metadata);
        let xml = self.get(&self.forge_metadata).await?.text().await?;
        let metadata: MavenMetadata = quick_xml::de::from_str(&xml)?;

        let mut versions = metadata.versioning.versions.version;
        versions.sort_by_cached_key(|id| {
            let (game, build) = id.split_once('-').unwrap_or((id.as_str(), ""));
            Reverse((version_key(game), version_key(build)))
        });
        Ok(versions)
    }

    async fn get(&self, url: &str) -> LauncherResult<reqwest::Response> {
        Ok(self
            .client
            .get(url)
            .timeout(API_TIMEOUT)
            .send()
            .await?
            .error_for_status()?)
    }
}
