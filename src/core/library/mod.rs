// ─── External launcher library ───
// Version installation, loader installation and the final game command line
// live in an external library. The launcher talks to it only through the
// `GameLibrary` trait below.

pub mod options;
pub mod progress;

#[cfg(test)]
pub mod fake;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::LauncherResult;
use crate::core::loaders::LoaderType;
use crate::core::version::scan_installed;

pub use options::LaunchOptions;
pub use progress::ProgressSink;

/// An entry of the library's installed-versions listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledVersion {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
}

#[async_trait]
pub trait GameLibrary: Send + Sync {
    /// Versions present in `game_dir/versions`, read from their version json
    /// headers unless the library keeps its own index.
    async fn installed_versions(&self, game_dir: &Path) -> LauncherResult<Vec<InstalledVersion>> {
        scan_installed(game_dir).await
    }

    /// Versions offered for a loader: vanilla releases, raw Forge
    /// `<game>-<build>` ids, or stable Fabric game versions.
    async fn available_versions(&self, loader: LoaderType) -> LauncherResult<Vec<String>>;

    async fn install_version(
        &self,
        version_id: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()>;

    async fn install_fabric(
        &self,
        game_version: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()>;

    async fn install_forge(
        &self,
        forge_version: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()>;

    /// Full command line (program first) for launching `version_id`.
    async fn launch_command(
        &self,
        version_id: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> LauncherResult<Vec<String>>;
}

/// Ids of the installed versions, as reported by the library.
pub async fn installed_ids(
    library: &dyn GameLibrary,
    game_dir: &Path,
) -> LauncherResult<Vec<String>> {
    Ok(library
        .installed_versions(game_dir)
        .await?
        .into_iter()
        .map(|v| v.id)
        .collect())
}
