use async_trait::async_trait;
use tracing::info;

use super::context::InstallContext;
use super::installer::{installed_set, new_ids, LoaderInstaller};
use crate::core::error::{LauncherError, LauncherResult};

/// Forge installs into a version namespace derived from the selected
/// `<game>-<build>` string, and re-running the installer is skipped when a
/// matching id already exists.
pub struct ForgeInstaller;

impl ForgeInstaller {
    /// Installed id for `selected` (`<game>-<build>`), matched by naming
    /// convention: contains `forge`, the base version and the build.
    pub fn find_by_name<'a>(
        ids: impl IntoIterator<Item = &'a String>,
        selected: &str,
        base_version: &str,
    ) -> Option<String> {
        let build = selected.rsplit('-').next().unwrap_or(selected);
        ids.into_iter()
            .find(|id| {
                id.to_lowercase().contains("forge") && id.contains(base_version) && id.contains(build)
            })
            .cloned()
    }
}

#[async_trait]
impl LoaderInstaller for ForgeInstaller {
    async fn ensure_installed(&self, ctx: &InstallContext<'_>) -> LauncherResult<String> {
        let before = installed_set(ctx).await?;

        if let Some(id) = Self::find_by_name(&before, ctx.selected_version, ctx.base_version) {
            ctx.sink.set_status(&format!("Forge already installed: {id}"))?;
            return Ok(id);
        }

        (ctx.installing)();
        ctx.sink
            .set_status(&format!("Installing Forge {}", ctx.selected_version))?;
        ctx.library
            .install_forge(ctx.selected_version, ctx.game_dir, ctx.sink)
            .await?;

        let after = installed_set(ctx).await?;
        if let Some(id) = new_ids(&before, &after).into_iter().next() {
            info!("New Forge installed: {}", id);
            return Ok(id);
        }

        Self::find_by_name(&after, ctx.selected_version, ctx.base_version)
            .map(|id| {
                info!("Forge found after installation: {}", id);
                id
            })
            .ok_or_else(|| LauncherError::VersionNotFound(format!("Forge {}", ctx.selected_version)))
    }

    fn profile_name(&self, base_version: &str) -> String {
        format!("{base_version} Forge")
    }
}
