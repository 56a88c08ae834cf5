use std::collections::BTreeSet;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::error::LauncherResult;
use crate::core::version::manager::{version_dir_names, version_dir_names_blocking, version_path};

/// Removes partial installs left behind by a cancelled launch.
///
/// Snapshots `versions/` when created. If it is dropped while still armed
/// and the launch was cancelled, every version directory that appeared
/// since the snapshot is deleted; directories that existed before are never
/// touched.
pub struct InstallGuard {
    game_dir: PathBuf,
    before: BTreeSet<String>,
    cancel: CancellationToken,
    armed: bool,
}

impl InstallGuard {
    pub async fn begin(game_dir: impl Into<PathBuf>, cancel: CancellationToken) -> LauncherResult<Self> {
        let game_dir = game_dir.into();
        let before = version_dir_names(&game_dir).await?;
        Ok(Self {
            game_dir,
            before,
            cancel,
            armed: true,
        })
    }

    /// Installation is over; keep whatever it produced.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        if !self.armed || !self.cancel.is_cancelled() {
            return;
        }

        let after = version_dir_names_blocking(&self.game_dir);
        for id in after.difference(&self.before) {
            let path = version_path(&self.game_dir, id);
            match std::fs::remove_dir_all(&path) {
                Ok(()) => info!("Removed partial install {:?}", path),
                Err(e) => warn!("Could not remove partial install {:?}: {}", path, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::fake::write_version;

    #[tokio::test]
    async fn cancelled_guard_removes_only_new_versions() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.19.4");
        let token = CancellationToken::new();

        let guard = InstallGuard::begin(dir.path(), token.clone()).await.unwrap();
        write_version(dir.path(), "1.20.1");
        write_version(dir.path(), "fabric-loader-0.15.7-1.20.1");
        token.cancel();
        drop(guard);

        let left = version_dir_names(dir.path()).await.unwrap();
        assert_eq!(left.into_iter().collect::<Vec<_>>(), vec!["1.19.4"]);
    }

    #[tokio::test]
    async fn untouched_without_cancel_or_when_disarmed() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let guard = InstallGuard::begin(dir.path(), token.clone()).await.unwrap();
        write_version(dir.path(), "1.20.1");
        drop(guard);
        assert!(version_path(dir.path(), "1.20.1").exists());

        let guard = InstallGuard::begin(dir.path(), token.clone()).await.unwrap();
        write_version(dir.path(), "1.20.2");
        token.cancel();
        guard.disarm();
        assert!(version_path(dir.path(), "1.20.2").exists());
    }
}
