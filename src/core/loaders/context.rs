use std::path::Path;

use crate::core::library::{GameLibrary, ProgressSink};

/// Everything a loader strategy needs for one launch attempt.
pub struct InstallContext<'a> {
    pub library: &'a dyn GameLibrary,
    pub game_dir: &'a Path,
    /// Version string as picked by the user, e.g. `1.20.1-47.2.0`.
    pub selected_version: &'a str,
    /// Underlying game version, already installed when the strategy runs.
    pub base_version: &'a str,
    pub sink: &'a dyn ProgressSink,
    /// Called right before the strategy hands over to a library installer.
    pub installing: &'a (dyn Fn() + Send + Sync),
}
