use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{info, warn};

use crate::core::catalog::ModrinthClient;
use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::launch::{self, LaunchFailure, LaunchOutcome, LaunchRequest, LaunchSink};
use crate::core::library::GameLibrary;
use crate::core::loaders::LoaderType;
use crate::core::mods::{DownloadManager, InstalledModsRegistry, LocalMod, ModEvent};
use crate::core::paths::LauncherPaths;
use crate::core::settings::{self, Settings};
use crate::core::updater::Updater;
use crate::core::version::{group_installed, scan_installed, InstalledGroup, VersionLists};

/// Everything the shell needs for one launcher session.
pub struct AppState {
    pub paths: LauncherPaths,
    pub settings: Settings,
    pub http_client: Client,
    pub catalog: ModrinthClient,
    pub registry: Arc<AsyncMutex<InstalledModsRegistry>>,
    pub downloads: DownloadManager,
    pub updater: Updater,
    pub versions: VersionLists,
}

impl AppState {
    /// Resolve the default directories and load the session.
    pub async fn initialize() -> LauncherResult<(Self, mpsc::UnboundedReceiver<ModEvent>)> {
        Self::new(LauncherPaths::resolve()?).await
    }

    /// Load settings and the installed-mods registry below `paths`.
    ///
    /// The receiver yields the download manager's events.
    pub async fn new(
        paths: LauncherPaths,
    ) -> LauncherResult<(Self, mpsc::UnboundedReceiver<ModEvent>)> {
        let settings = settings::load(&paths.settings_file());
        let http_client = build_http_client()?;
        let catalog = ModrinthClient::new(http_client.clone());
        let registry = Arc::new(AsyncMutex::new(
            InstalledModsRegistry::load(paths.installed_mods_file()).await,
        ));

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let downloads = DownloadManager::new(
            catalog.clone(),
            registry.clone(),
            paths.mods_dir(),
            events_tx,
        );
        let updater = Updater::new(http_client.clone());
        let versions = VersionLists::new(http_client.clone());

        info!(
            "Launcher state ready (data: {:?}, game: {:?})",
            paths.data_dir(),
            paths.game_dir()
        );

        Ok((
            Self {
                paths,
                settings,
                http_client,
                catalog,
                registry,
                downloads,
                updater,
                versions,
            },
            events_rx,
        ))
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        settings::try_save(&self.paths.settings_file(), &self.settings)
    }

    /// Persist the settings on the way out; a failure is only logged.
    pub fn shutdown(&self) {
        settings::save(&self.paths.settings_file(), &self.settings);
        info!("Launcher state saved");
    }

    pub async fn scan_mods(&self) -> Vec<LocalMod> {
        let registry = self.registry.lock().await;
        self.catalog
            .scan_local(&self.paths.mods_dir(), &registry)
            .await
    }

    /// Versions the picker offers for `loader`.
    pub async fn available_versions(&self, loader: LoaderType) -> LauncherResult<Vec<String>> {
        self.versions.available(loader).await
    }

    /// Installed versions of the game directory, grouped by base version.
    pub async fn installed_versions(&self) -> LauncherResult<Vec<InstalledGroup>> {
        let ids: Vec<String> = scan_installed(self.paths.game_dir())
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        Ok(group_installed(&ids))
    }

    /// Launch with the current settings, reporting on `sink`.
    pub async fn launch(
        &self,
        library: &dyn GameLibrary,
        request: &LaunchRequest,
        sink: &LaunchSink,
    ) -> LaunchOutcome {
        launch::launch(library, self.paths.game_dir(), &self.settings, request, sink).await
    }

    /// Apply the remedy offered for `failure` and persist the settings.
    ///
    /// Returns false when the failure has no remedy.
    pub async fn apply_fix(&mut self, failure: &LaunchFailure) -> LauncherResult<bool> {
        let Some(action) = failure.fix_action() else {
            warn!("No fix available for {:?}", failure.kind);
            return Ok(false);
        };
        action
            .apply(&mut self.settings, self.paths.game_dir(), &failure.version_id)
            .await?;
        self.save_settings()?;
        Ok(true)
    }
}
