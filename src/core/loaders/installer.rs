use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{
    context::InstallContext, fabric::FabricInstaller, forge::ForgeInstaller,
    vanilla::VanillaInstaller, LoaderType,
};
use crate::core::error::LauncherResult;
use crate::core::library::installed_ids;

#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    /// Install the loader if needed and return the launchable version id.
    async fn ensure_installed(&self, ctx: &InstallContext<'_>) -> LauncherResult<String>;

    /// Name of the ledger profile created for this loader.
    fn profile_name(&self, base_version: &str) -> String;
}

/// Static dispatch over the loader strategies.
pub enum Installer {
    Vanilla(VanillaInstaller),
    Forge(ForgeInstaller),
    Fabric(FabricInstaller),
}

impl Installer {
    pub fn new(loader: LoaderType) -> Self {
        match loader {
            LoaderType::Vanilla => Self::Vanilla(VanillaInstaller),
            LoaderType::Forge => Self::Forge(ForgeInstaller),
            LoaderType::Fabric => Self::Fabric(FabricInstaller),
        }
    }

    pub async fn ensure_installed(&self, ctx: &InstallContext<'_>) -> LauncherResult<String> {
        match self {
            Installer::Vanilla(i) => i.ensure_installed(ctx).await,
            Installer::Forge(i) => i.ensure_installed(ctx).await,
            Installer::Fabric(i) => i.ensure_installed(ctx).await,
        }
    }

    pub fn profile_name(&self, base_version: &str) -> String {
        match self {
            Installer::Vanilla(i) => i.profile_name(base_version),
            Installer::Forge(i) => i.profile_name(base_version),
            Installer::Fabric(i) => i.profile_name(base_version),
        }
    }
}

/// Installed version ids as reported by the library, as a set.
pub(super) async fn installed_set(ctx: &InstallContext<'_>) -> LauncherResult<BTreeSet<String>> {
    Ok(installed_ids(ctx.library, ctx.game_dir)
        .await?
        .into_iter()
        .collect())
}

/// Ids present after an install call that were not there before.
pub(super) fn new_ids(before: &BTreeSet<String>, after: &BTreeSet<String>) -> Vec<String> {
    after.difference(before).cloned().collect()
}
