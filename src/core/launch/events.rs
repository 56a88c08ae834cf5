use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::library::ProgressSink;

/// Stages of one launch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    Idle,
    ResolvingBaseVersion,
    InstallingBase,
    ResolvingLoader,
    InstallingLoader,
    RegisteringProfile,
    BuildingCommand,
    ProcessRunning,
    Success,
    GameProcessError,
    Interrupted,
}

impl LaunchState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LaunchState::Success | LaunchState::GameProcessError | LaunchState::Interrupted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchEvent {
    State { state: LaunchState },
    Status { text: String },
    Progress { current: u64, max: u64 },
    Log { line: String },
}

/// Event sink for one launch attempt.
///
/// Handed to the library as its `ProgressSink`; every callback fails with
/// `Cancelled` once the token is set, which unwinds the install in progress.
/// A dropped receiver is not an error.
#[derive(Clone)]
pub struct LaunchSink {
    events: mpsc::UnboundedSender<LaunchEvent>,
    cancel: CancellationToken,
}

impl LaunchSink {
    pub fn new(events: mpsc::UnboundedSender<LaunchEvent>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn check_cancelled(&self) -> LauncherResult<()> {
        if self.cancel.is_cancelled() {
            Err(LauncherError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn state(&self, state: LaunchState) {
        debug!("Launch state: {:?}", state);
        let _ = self.events.send(LaunchEvent::State { state });
    }

    pub fn log(&self, line: impl Into<String>) {
        let _ = self.events.send(LaunchEvent::Log { line: line.into() });
    }
}

impl ProgressSink for LaunchSink {
    fn set_status(&self, text: &str) -> LauncherResult<()> {
        self.check_cancelled()?;
        let _ = self.events.send(LaunchEvent::Status {
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_progress(&self, current: u64, max: u64) -> LauncherResult<()> {
        self.check_cancelled()?;
        let _ = self.events.send(LaunchEvent::Progress { current, max });
        Ok(())
    }
}
