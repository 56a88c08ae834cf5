use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

const STUDIO_DIR_NAME: &str = "Hru Hru Studio";
const APP_DIR_NAME: &str = "Hru Hru Launcher";

pub const DATA_DIR_ENV: &str = "HRUHRU_DATA_DIR";
pub const GAME_DIR_ENV: &str = "HRUHRU_GAME_DIR";

pub const SETTINGS_FILE: &str = "launcher_settings.json";
pub const PROFILES_FILE: &str = "launcher_profiles.json";
pub const INSTALLED_MODS_FILE: &str = "installed_mods.json";

/// Directories the launcher reads and writes.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    data_dir: PathBuf,
    game_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(data_dir: PathBuf, game_dir: PathBuf) -> Self {
        Self { data_dir, game_dir }
    }

    /// Resolve the default layout, honouring the environment overrides,
    /// and create both directories.
    pub fn resolve() -> LauncherResult<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let game_dir = std::env::var_os(GAME_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_game_dir);

        create_dir(&data_dir)?;
        create_dir(&game_dir)?;

        Ok(Self { data_dir, game_dir })
    }

    /// Launcher-owned data (settings).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The game directory shared with the external launcher library.
    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.game_dir.join(PROFILES_FILE)
    }

    pub fn installed_mods_file(&self) -> PathBuf {
        self.game_dir.join(INSTALLED_MODS_FILE)
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.game_dir.join("mods")
    }

    pub fn versions_dir(&self) -> PathBuf {
        versions_dir(&self.game_dir)
    }
}

pub fn versions_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("versions")
}

fn default_data_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STUDIO_DIR_NAME)
        .join(APP_DIR_NAME)
}

/// Platform default game directory, matching what the vanilla launcher uses.
pub fn default_game_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}

fn create_dir(path: &Path) -> LauncherResult<()> {
    std::fs::create_dir_all(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_locations_follow_layout() {
        let paths = LauncherPaths::new(PathBuf::from("/data"), PathBuf::from("/game"));
        assert_eq!(paths.settings_file(), Path::new("/data/launcher_settings.json"));
        assert_eq!(paths.profiles_file(), Path::new("/game/launcher_profiles.json"));
        assert_eq!(paths.installed_mods_file(), Path::new("/game/installed_mods.json"));
        assert_eq!(paths.mods_dir(), Path::new("/game/mods"));
        assert_eq!(paths.versions_dir(), Path::new("/game/versions"));
    }
}
