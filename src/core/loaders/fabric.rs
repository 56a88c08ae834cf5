use async_trait::async_trait;
use tracing::{info, warn};

use super::context::InstallContext;
use super::installer::{installed_set, new_ids, LoaderInstaller};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::version_key;

const FABRIC_PREFIX: &str = "fabric-loader-";

/// Fabric creates a new `fabric-loader-<build>-<game>` id per loader build,
/// so the launchable id is found by diffing the installed set.
pub struct FabricInstaller;

impl FabricInstaller {
    /// Highest loader build installed for `base_version`.
    pub fn find_by_name<'a>(
        ids: impl IntoIterator<Item = &'a String>,
        base_version: &str,
    ) -> Option<String> {
        let suffix = format!("-{base_version}");
        ids.into_iter()
            .filter_map(|id| {
                let build = id.strip_prefix(FABRIC_PREFIX)?.strip_suffix(&suffix)?;
                Some((version_key(build), id))
            })
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, id)| id.clone())
    }
}

#[async_trait]
impl LoaderInstaller for FabricInstaller {
    async fn ensure_installed(&self, ctx: &InstallContext<'_>) -> LauncherResult<String> {
        let before = installed_set(ctx).await?;

        (ctx.installing)();
        ctx.sink
            .set_status(&format!("Installing Fabric for {}", ctx.base_version))?;
        ctx.library
            .install_fabric(ctx.base_version, ctx.game_dir, ctx.sink)
            .await?;

        let after = installed_set(ctx).await?;
        let created = new_ids(&before, &after);

        if let [id] = created.as_slice() {
            info!("New Fabric version installed: {}", id);
            return Ok(id.clone());
        }
        if created.len() > 1 {
            warn!("Fabric install created several versions: {:?}", created);
            if let Some(id) = Self::find_by_name(&created, ctx.base_version) {
                return Ok(id);
            }
        }

        match Self::find_by_name(&after, ctx.base_version) {
            Some(id) => {
                info!("Fabric found by name: {}", id);
                Ok(id)
            }
            None => Err(LauncherError::VersionNotFound(format!(
                "Fabric {}",
                ctx.selected_version
            ))),
        }
    }

    fn profile_name(&self, base_version: &str) -> String {
        format!("{base_version} Fabric")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::fake::{write_version, FakeLibrary};
    use crate::core::library::progress::NoProgress;

    fn ctx<'a>(library: &'a FakeLibrary, dir: &'a std::path::Path) -> InstallContext<'a> {
        InstallContext {
            library,
            game_dir: dir,
            selected_version: "1.20.1",
            base_version: "1.20.1",
            sink: &NoProgress,
            installing: &|| {},
        }
    }

    #[test]
    fn name_match_prefers_highest_build() {
        let ids: Vec<String> = [
            "fabric-loader-0.14.21-1.20.1",
            "fabric-loader-0.15.7-1.20.1",
            "fabric-loader-0.16.0-1.19.4",
            "1.20.1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            FabricInstaller::find_by_name(&ids, "1.20.1").as_deref(),
            Some("fabric-loader-0.15.7-1.20.1")
        );
        assert_eq!(FabricInstaller::find_by_name(&ids, "1.18.2"), None);
    }

    #[tokio::test]
    async fn new_version_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        write_version(dir.path(), "fabric-loader-0.14.21-1.20.1");
        let library = FakeLibrary::new();
        library.fabric_creates(Some("fabric-loader-0.15.7-1.20.1"));

        let id = FabricInstaller
            .ensure_installed(&ctx(&library, dir.path()))
            .await
            .unwrap();
        assert_eq!(id, "fabric-loader-0.15.7-1.20.1");
        assert_eq!(library.calls(), vec!["install_fabric 1.20.1"]);
    }

    #[tokio::test]
    async fn empty_diff_falls_back_to_name_match() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        write_version(dir.path(), "fabric-loader-0.15.7-1.20.1");
        let library = FakeLibrary::new();

        let id = FabricInstaller
            .ensure_installed(&ctx(&library, dir.path()))
            .await
            .unwrap();
        assert_eq!(id, "fabric-loader-0.15.7-1.20.1");
    }

    #[tokio::test]
    async fn nothing_found_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        let library = FakeLibrary::new();

        let err = FabricInstaller
            .ensure_installed(&ctx(&library, dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::VersionNotFound(_)));
    }
}
