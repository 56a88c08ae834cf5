use async_trait::async_trait;
use tracing::info;

use super::context::InstallContext;
use super::installer::LoaderInstaller;
use crate::core::error::LauncherResult;

/// Vanilla needs nothing on top of the base version.
pub struct VanillaInstaller;

#[async_trait]
impl LoaderInstaller for VanillaInstaller {
    async fn ensure_installed(&self, ctx: &InstallContext<'_>) -> LauncherResult<String> {
        info!("Launching vanilla {}", ctx.base_version);
        Ok(ctx.base_version.to_string())
    }

    fn profile_name(&self, base_version: &str) -> String {
        base_version.to_string()
    }
}
