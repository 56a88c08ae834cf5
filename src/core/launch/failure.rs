use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::settings::Settings;
use crate::core::version::manager::delete_version;

/// Printed by the JVM when the client jar is missing or damaged.
pub const MISSING_CLIENT_CLASS: &str = "Could not find net/minecraft/client/Minecraft.class";

const CORRUPTED_ARCHIVE: &str = "ZipException: zip END header not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    FileCorruption,
    InvalidJvmArgument,
    InvalidJavaPath,
    Network,
    Generic,
}

impl FailureKind {
    /// Map a failed launch to the kind of problem the user can act on.
    ///
    /// Output markers win over the exit code; exit code 1 is the JVM
    /// rejecting its own arguments.
    pub fn classify(error: &LauncherError) -> Self {
        match error {
            LauncherError::GameProcess { output, .. }
                if output.lines().any(|line| detect_diagnostic(line).is_some()) =>
            {
                FailureKind::FileCorruption
            }
            LauncherError::GameProcess { exit_code: 1, .. } => FailureKind::InvalidJvmArgument,
            LauncherError::JavaExecution { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                FailureKind::InvalidJavaPath
            }
            e if e.is_network() => FailureKind::Network,
            _ => FailureKind::Generic,
        }
    }

    pub fn fix_action(self) -> Option<FixAction> {
        match self {
            FailureKind::FileCorruption => Some(FixAction::ReinstallVersion),
            FailureKind::InvalidJvmArgument => Some(FixAction::ClearJvmArguments),
            FailureKind::InvalidJavaPath => Some(FixAction::ResetJavaPath),
            FailureKind::Network | FailureKind::Generic => None,
        }
    }
}

/// Output lines that point at damaged game files.
pub fn detect_diagnostic(line: &str) -> Option<FailureKind> {
    if line.contains(MISSING_CLIENT_CLASS) || line.contains(CORRUPTED_ARCHIVE) {
        return Some(FailureKind::FileCorruption);
    }
    None
}

/// A launch that did not reach a clean game exit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Version the attempt was working on when it failed.
    pub version_id: String,
    pub exit_code: Option<i32>,
}

impl LaunchFailure {
    pub fn from_error(error: &LauncherError, version_id: &str) -> Self {
        let exit_code = match error {
            LauncherError::GameProcess { exit_code, .. } => Some(*exit_code),
            _ => None,
        };
        Self {
            kind: FailureKind::classify(error),
            message: error.to_string(),
            version_id: version_id.to_string(),
            exit_code,
        }
    }

    pub fn fix_action(&self) -> Option<FixAction> {
        self.kind.fix_action()
    }
}

/// One-click remedies offered for a failed launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    /// Delete the version directory so the next launch installs it again.
    ReinstallVersion,
    ClearJvmArguments,
    ResetJavaPath,
}

impl FixAction {
    /// Apply the remedy. Settings changes are in memory only; the caller
    /// persists them.
    pub async fn apply(
        self,
        settings: &mut Settings,
        game_dir: &Path,
        version_id: &str,
    ) -> LauncherResult<()> {
        match self {
            FixAction::ReinstallVersion => match delete_version(game_dir, version_id).await {
                Ok(()) | Err(LauncherError::VersionNotFound(_)) => {}
                Err(e) => return Err(e),
            },
            FixAction::ClearJvmArguments => settings.jvm_args.clear(),
            FixAction::ResetJavaPath => settings.java_path = None,
        }
        info!("Applied fix {:?} for {}", self, version_id);
        Ok(())
    }
}
