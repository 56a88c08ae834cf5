use crate::core::error::LauncherResult;

/// Status/progress callbacks handed to long-running library calls.
///
/// Both methods are fallible: once the launch is cancelled they return
/// `LauncherError::Cancelled`, and the library is expected to propagate it
/// with `?` so the install unwinds at its next callback.
pub trait ProgressSink: Send + Sync {
    fn set_status(&self, text: &str) -> LauncherResult<()>;
    fn set_progress(&self, current: u64, max: u64) -> LauncherResult<()>;
}

/// Sink that ignores everything. Useful for calls that cannot be cancelled.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_status(&self, _text: &str) -> LauncherResult<()> {
        Ok(())
    }

    fn set_progress(&self, _current: u64, _max: u64) -> LauncherResult<()> {
        Ok(())
    }
}
