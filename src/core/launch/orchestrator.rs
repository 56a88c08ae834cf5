use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use super::events::{LaunchSink, LaunchState};
use super::failure::LaunchFailure;
use super::guard::InstallGuard;
use super::process::run_game;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::library::{installed_ids, GameLibrary, LaunchOptions, ProgressSink};
use crate::core::loaders::context::InstallContext;
use crate::core::loaders::installer::Installer;
use crate::core::loaders::LoaderType;
use crate::core::profiles;
use crate::core::settings::Settings;
use crate::core::version::get_base_version;
use crate::core::version::manager::version_path;

/// What the user asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Version as shown in the picker: `1.20.1`, or `1.20.1-47.2.0` for Forge.
    pub selected_version: String,
    pub loader: LoaderType,
    pub username: String,
    pub resolution: Option<(u32, u32)>,
}

impl LaunchRequest {
    /// Last selection stored in the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            selected_version: settings.last_version.clone(),
            loader: settings.version_type,
            username: settings.last_username.clone(),
            resolution: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Success { version_id: String },
    Failed(LaunchFailure),
    Cancelled,
}

/// Run one launch attempt from version resolution to game exit.
///
/// Every stage is reported on `sink`. Cancelling the sink's token stops the
/// attempt at the next callback or stage boundary, removes version
/// directories created by an interrupted install and kills a running game.
pub async fn launch(
    library: &dyn GameLibrary,
    game_dir: &Path,
    settings: &Settings,
    request: &LaunchRequest,
    sink: &LaunchSink,
) -> LaunchOutcome {
    info!(
        "Launch requested: {} ({}) as {}",
        request.selected_version, request.loader, request.username
    );

    let mut version_id = request.selected_version.clone();
    let result = run(library, game_dir, settings, request, sink, &mut version_id).await;

    match result {
        Ok(()) => {
            sink.state(LaunchState::Success);
            LaunchOutcome::Success { version_id }
        }
        Err(e) if e.is_cancelled() || sink.cancel_token().is_cancelled() => {
            info!("Launch of {} interrupted", version_id);
            sink.state(LaunchState::Interrupted);
            LaunchOutcome::Cancelled
        }
        Err(e) => {
            error!("Launch of {} failed: {}", version_id, e);
            sink.state(LaunchState::GameProcessError);
            LaunchOutcome::Failed(LaunchFailure::from_error(&e, &version_id))
        }
    }
}

async fn run(
    library: &dyn GameLibrary,
    game_dir: &Path,
    settings: &Settings,
    request: &LaunchRequest,
    sink: &LaunchSink,
    version_id: &mut String,
) -> LauncherResult<()> {
    // ── Base version ──
    sink.state(LaunchState::ResolvingBaseVersion);
    profiles::ensure_initialized(game_dir, &settings.client_token).await?;

    let base = get_base_version(&request.selected_version);
    *version_id = base.clone();

    let guard = InstallGuard::begin(game_dir, sink.cancel_token().clone()).await?;

    let installed = installed_ids(library, game_dir).await?;
    if !installed.contains(&base) {
        sink.state(LaunchState::InstallingBase);
        sink.set_status(&format!("Installing {base}"))?;
        library.install_version(&base, game_dir, sink).await?;
    }
    sink.check_cancelled()?;

    let base_json = version_path(game_dir, &base).join(format!("{base}.json"));
    if !tokio::fs::try_exists(&base_json).await.unwrap_or(false) {
        return Err(LauncherError::VersionNotFound(base));
    }

    // ── Loader ──
    let installer = Installer::new(request.loader);
    if request.loader.is_modded() {
        sink.state(LaunchState::ResolvingLoader);
        let mods_dir = game_dir.join("mods");
        tokio::fs::create_dir_all(&mods_dir)
            .await
            .map_err(|e| LauncherError::io(&mods_dir, e))?;
    }

    let installing = || sink.state(LaunchState::InstallingLoader);
    let ctx = InstallContext {
        library,
        game_dir,
        selected_version: &request.selected_version,
        base_version: &base,
        sink,
        installing: &installing,
    };
    let launch_id = installer.ensure_installed(&ctx).await?;

    if request.loader.is_modded() && launch_id == base {
        return Err(LauncherError::VersionNotFound(format!(
            "{} {}",
            request.loader, request.selected_version
        )));
    }
    *version_id = launch_id.clone();
    guard.disarm();

    // ── Profile ──
    sink.state(LaunchState::RegisteringProfile);
    profiles::add_profile(game_dir, &launch_id, &installer.profile_name(&base)).await?;
    sink.check_cancelled()?;

    // ── Command ──
    sink.state(LaunchState::BuildingCommand);
    let mut options = LaunchOptions::from_settings(settings, &request.username, game_dir);
    if let Some((width, height)) = request.resolution {
        options = options.with_resolution(width, height);
    }
    let command = library.launch_command(&launch_id, game_dir, &options).await?;
    sink.check_cancelled()?;

    // ── Game ──
    sink.state(LaunchState::ProcessRunning);
    sink.set_status(&format!("Running {launch_id}"))?;
    run_game(&command, game_dir, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::launch::events::LaunchEvent;
    use crate::core::launch::failure::FailureKind;
    use crate::core::library::fake::{write_version, FakeLibrary};
    use crate::core::version::version_dir_names;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn request(selected: &str, loader: LoaderType) -> LaunchRequest {
        LaunchRequest {
            selected_version: selected.into(),
            loader,
            username: "Steve".into(),
            resolution: Some((1280, 720)),
        }
    }

    fn states(rx: &mut mpsc::UnboundedReceiver<LaunchEvent>) -> Vec<LaunchState> {
        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let LaunchEvent::State { state } = event {
                states.push(state);
            }
        }
        states
    }

    async fn run_launch(
        library: &FakeLibrary,
        dir: &Path,
        request: &LaunchRequest,
        token: CancellationToken,
    ) -> (LaunchOutcome, Vec<LaunchState>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = LaunchSink::new(tx, token);
        let outcome = launch(library, dir, &Settings::default(), request, &sink).await;
        (outcome, states(&mut rx))
    }

    #[tokio::test]
    async fn fabric_without_new_version_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        let library = FakeLibrary::new();
        library.fabric_creates(None);

        let (outcome, states) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Fabric),
            CancellationToken::new(),
        )
        .await;

        match outcome {
            LaunchOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Generic);
                assert!(failure.message.contains("Could not find installed version"));
                assert_eq!(failure.version_id, "1.20.1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(states.last(), Some(&LaunchState::GameProcessError));
        assert!(!library.calls().iter().any(|c| c.starts_with("launch_command")));
        assert!(dir.path().join("mods").is_dir());
    }

    #[tokio::test]
    async fn cancel_during_install_removes_only_new_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.19.4");
        let token = CancellationToken::new();
        let library = FakeLibrary::new();
        library.cancel_during_install(token.clone());

        let (outcome, states) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Vanilla),
            token,
        )
        .await;

        assert_eq!(outcome, LaunchOutcome::Cancelled);
        assert_eq!(states.last(), Some(&LaunchState::Interrupted));
        assert!(states.contains(&LaunchState::InstallingBase));
        let left: Vec<_> = version_dir_names(dir.path()).await.unwrap().into_iter().collect();
        assert_eq!(left, vec!["1.19.4"]);
    }

    #[tokio::test]
    async fn library_http_failure_is_network() {
        let dir = tempfile::tempdir().unwrap();
        let library = FakeLibrary::new();
        library.fail_install_with_status(503);

        let (outcome, _) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Vanilla),
            CancellationToken::new(),
        )
        .await;

        match outcome {
            LaunchOutcome::Failed(failure) => assert_eq!(failure.kind, FailureKind::Network),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_java_is_invalid_java_path() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        let missing = dir.path().join("no-such-java").to_string_lossy().into_owned();
        let library = FakeLibrary::new();
        library.set_command(&[missing.as_str(), "-jar", "client.jar"]);

        let (outcome, _) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Vanilla),
            CancellationToken::new(),
        )
        .await;

        match outcome {
            LaunchOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::InvalidJavaPath);
                assert_eq!(failure.version_id, "1.20.1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn forge_launch_runs_game_and_registers_profile() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        let library = FakeLibrary::new();
        library.forge_creates(Some("1.20.1-forge-47.2.0"));
        library.set_command(&["sh", "-c", "echo '[main] Setting user: Steve'"]);

        let (outcome, states) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1-47.2.0", LoaderType::Forge),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            outcome,
            LaunchOutcome::Success {
                version_id: "1.20.1-forge-47.2.0".into()
            }
        );
        assert_eq!(
            states,
            vec![
                LaunchState::ResolvingBaseVersion,
                LaunchState::ResolvingLoader,
                LaunchState::InstallingLoader,
                LaunchState::RegisteringProfile,
                LaunchState::BuildingCommand,
                LaunchState::ProcessRunning,
                LaunchState::Success,
            ]
        );

        let ledger = profiles::read_ledger(dir.path()).await.unwrap();
        let profile = ledger.selected().unwrap();
        assert_eq!(profile.name, "1.20.1 Forge");
        assert_eq!(profile.last_version_id, "1.20.1-forge-47.2.0");

        let options = library.last_options().unwrap();
        assert_eq!(options.username, "Steve");
        assert_eq!(options.token, "0");
        assert_eq!(options.resolution_width, Some(1280));
        assert_eq!(options.game_directory, dir.path());
        assert_eq!(
            library.calls(),
            vec!["install_forge 1.20.1-47.2.0", "launch_command 1.20.1-forge-47.2.0"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn game_exit_codes_are_classified() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "1.20.1");
        let library = FakeLibrary::new();

        library.set_command(&["sh", "-c", "echo 'Unrecognized VM option' 1>&2; exit 1"]);
        let (outcome, _) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Vanilla),
            CancellationToken::new(),
        )
        .await;
        match outcome {
            LaunchOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::InvalidJvmArgument);
                assert_eq!(failure.exit_code, Some(1));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        library.set_command(&[
            "sh",
            "-c",
            "echo 'Error: Could not find net/minecraft/client/Minecraft.class'; exit 1",
        ]);
        let (outcome, _) = run_launch(
            &library,
            dir.path(),
            &request("1.20.1", LoaderType::Vanilla),
            CancellationToken::new(),
        )
        .await;
        match outcome {
            LaunchOutcome::Failed(failure) => assert_eq!(failure.kind, FailureKind::FileCorruption),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
