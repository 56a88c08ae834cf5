use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::model::{Project, ProjectVersion, SearchHit, SearchResponse, SortIndex};
use crate::core::downloader::Downloader;
use crate::core::error::LauncherResult;
use crate::core::http::{API_TIMEOUT, BULK_TIMEOUT};
use crate::core::loaders::LoaderType;
use crate::core::mods::{self, InstalledModsRegistry, LocalMod};

pub const MODRINTH_API_URL: &str = "https://api.modrinth.com/v2";
const MODRINTH_SITE_URL: &str = "https://modrinth.com";
const SEARCH_LIMIT: u32 = 20;

/// Query parameters of a search request.
pub fn search_params(
    query: &str,
    game_version: &str,
    loader: LoaderType,
    sort: SortIndex,
    offset: u32,
) -> Vec<(&'static str, String)> {
    let facets = serde_json::json!([
        [format!("versions:{game_version}")],
        ["project_type:mod"],
        [format!("categories:{loader}")],
    ]);

    vec![
        ("query", query.to_string()),
        ("facets", facets.to_string()),
        ("limit", SEARCH_LIMIT.to_string()),
        ("index", sort.as_str().to_string()),
        ("offset", offset.to_string()),
    ]
}

/// Public page of a project on the catalog website.
pub fn mod_page_url(slug: &str) -> String {
    format!("{MODRINTH_SITE_URL}/mod/{slug}")
}

#[derive(Clone)]
pub struct ModrinthClient {
    client: Client,
    base_url: String,
    downloader: Downloader,
}

impl ModrinthClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, MODRINTH_API_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            downloader: Downloader::new(client.clone()),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> LauncherResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    // ── Search ──────────────────────────────────────────

    /// One page of search results and the total hit count.
    ///
    /// Any failure is logged and reported as `([], 0)`.
    pub async fn search(
        &self,
        query: &str,
        game_version: &str,
        loader: LoaderType,
        sort: SortIndex,
        offset: u32,
    ) -> (Vec<SearchHit>, u64) {
        let params = search_params(query, game_version, loader, sort, offset);
        match self
            .get_json::<SearchResponse>("/search", &params, API_TIMEOUT)
            .await
        {
            Ok(page) => {
                debug!("Search '{}' returned {} of {}", query, page.hits.len(), page.total_hits);
                (page.hits, page.total_hits)
            }
            Err(e) => {
                error!("Error searching for mods ('{}'): {}", query, e);
                (Vec::new(), 0)
            }
        }
    }

    // ── Projects ────────────────────────────────────────

    pub async fn get_project(&self, project_id: &str) -> Option<Project> {
        if project_id.is_empty() {
            return None;
        }
        match self
            .get_json(&format!("/project/{project_id}"), &[], API_TIMEOUT)
            .await
        {
            Ok(project) => Some(project),
            Err(e) => {
                error!("Failed to get project details for {}: {}", project_id, e);
                None
            }
        }
    }

    /// Bulk project lookup. Ids are deduplicated; no ids means no request.
    pub async fn get_projects(&self, ids: &[String]) -> LauncherResult<Vec<Project>> {
        let unique: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }
        let ids_param = serde_json::to_string(&unique)?;
        self.get_json("/projects", &[("ids", ids_param)], BULK_TIMEOUT)
            .await
    }

    /// Newest version of a project that targets `game_version` and `loader`
    /// and carries at least one file.
    pub async fn get_latest_version(
        &self,
        project_id: &str,
        game_version: &str,
        loader: LoaderType,
    ) -> Option<ProjectVersion> {
        let query = [
            ("game_versions", serde_json::json!([game_version]).to_string()),
            ("loaders", serde_json::json!([loader.to_string()]).to_string()),
        ];
        let versions: Vec<ProjectVersion> = match self
            .get_json(&format!("/project/{project_id}/version"), &query, API_TIMEOUT)
            .await
        {
            Ok(versions) => versions,
            Err(e) => {
                error!(
                    "Could not find a version for {} (MC {}, {}): {}",
                    project_id, game_version, loader, e
                );
                return None;
            }
        };

        versions.into_iter().find(|v| !v.files.is_empty())
    }

    // ── Files ───────────────────────────────────────────

    /// Stream `url` into `dest_folder/filename`.
    ///
    /// `progress` gets percentages while the length is known and a final
    /// `100`. Any failure removes the partial file and returns `false`.
    pub async fn download(
        &self,
        url: &str,
        dest_folder: &Path,
        filename: &str,
        mut progress: impl FnMut(u8) + Send,
    ) -> bool {
        let dest = dest_folder.join(filename);
        match self
            .downloader
            .download_file(url, &dest, None, &CancellationToken::new(), &mut progress)
            .await
        {
            Ok(()) => {
                info!("File {} downloaded successfully", filename);
                true
            }
            Err(e) => {
                error!("Error downloading {}: {}", filename, e);
                false
            }
        }
    }

    /// Installed mods found in `mods_folder`, enriched from the registry and
    /// one bulk icon lookup.
    pub async fn scan_local(
        &self,
        mods_folder: &Path,
        registry: &InstalledModsRegistry,
    ) -> Vec<LocalMod> {
        mods::scan_local(self, mods_folder, registry).await
    }
}
