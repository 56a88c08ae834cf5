// In-memory stand-in for the external launcher library, backed by a real
// temporary game directory so directory-level behaviour can be asserted.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{GameLibrary, LaunchOptions, ProgressSink};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::LoaderType;
use crate::core::version::manager::version_path;

#[derive(Default)]
struct FakeState {
    available: HashMap<LoaderType, Vec<String>>,
    fabric_creates: Option<String>,
    forge_creates: Option<String>,
    cancel_during_install: Option<CancellationToken>,
    fail_install_with_status: Option<u16>,
    command: Vec<String>,
    calls: Vec<String>,
    last_options: Option<LaunchOptions>,
}

#[derive(Default)]
pub struct FakeLibrary {
    state: Mutex<FakeState>,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, loader: LoaderType, versions: &[&str]) {
        self.state.lock().unwrap().available.insert(
            loader,
            versions.iter().map(|v| v.to_string()).collect(),
        );
    }

    /// Version id `install_fabric` writes; `None` writes nothing.
    pub fn fabric_creates(&self, id: Option<&str>) {
        self.state.lock().unwrap().fabric_creates = id.map(str::to_string);
    }

    pub fn forge_creates(&self, id: Option<&str>) {
        self.state.lock().unwrap().forge_creates = id.map(str::to_string);
    }

    /// Cancel `token` right after the next install call has written its files.
    pub fn cancel_during_install(&self, token: CancellationToken) {
        self.state.lock().unwrap().cancel_during_install = Some(token);
    }

    pub fn fail_install_with_status(&self, status: u16) {
        self.state.lock().unwrap().fail_install_with_status = Some(status);
    }

    pub fn set_command(&self, command: &[&str]) {
        self.state.lock().unwrap().command = command.iter().map(|c| c.to_string()).collect();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_options(&self) -> Option<LaunchOptions> {
        self.state.lock().unwrap().last_options.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn after_install(&self, sink: &dyn ProgressSink) -> LauncherResult<()> {
        let (cancel, status) = {
            let state = self.state.lock().unwrap();
            (
                state.cancel_during_install.clone(),
                state.fail_install_with_status,
            )
        };
        if let Some(status) = status {
            return Err(LauncherError::DownloadFailed {
                url: "https://example.invalid/lib.jar".into(),
                status,
            });
        }
        if let Some(token) = cancel {
            token.cancel();
        }
        sink.set_progress(1, 2)?;
        sink.set_status("done")
    }
}

pub fn write_version(game_dir: &Path, id: &str) {
    let dir = version_path(game_dir, id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{id}.json")),
        format!(r#"{{"id":"{id}","type":"release"}}"#),
    )
    .unwrap();
}

#[async_trait]
impl GameLibrary for FakeLibrary {
    async fn available_versions(&self, loader: LoaderType) -> LauncherResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .available
            .get(&loader)
            .cloned()
            .unwrap_or_default())
    }

    async fn install_version(
        &self,
        version_id: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()> {
        self.record(format!("install_version {version_id}"));
        sink.set_status(&format!("Installing {version_id}"))?;
        write_version(game_dir, version_id);
        self.after_install(sink)
    }

    async fn install_fabric(
        &self,
        game_version: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()> {
        self.record(format!("install_fabric {game_version}"));
        let creates = self.state.lock().unwrap().fabric_creates.clone();
        if let Some(id) = creates {
            write_version(game_dir, &id);
        }
        self.after_install(sink)
    }

    async fn install_forge(
        &self,
        forge_version: &str,
        game_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> LauncherResult<()> {
        self.record(format!("install_forge {forge_version}"));
        let creates = self.state.lock().unwrap().forge_creates.clone();
        if let Some(id) = creates {
            write_version(game_dir, &id);
        }
        self.after_install(sink)
    }

    async fn launch_command(
        &self,
        version_id: &str,
        _game_dir: &Path,
        options: &LaunchOptions,
    ) -> LauncherResult<Vec<String>> {
        self.record(format!("launch_command {version_id}"));
        let mut state = self.state.lock().unwrap();
        state.last_options = Some(options.clone());
        Ok(state.command.clone())
    }
}
