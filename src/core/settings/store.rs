use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::model::Settings;
use crate::core::error::{LauncherError, LauncherResult};

/// Load settings, merging the persisted file over the defaults.
///
/// Missing, unreadable or corrupt files yield all defaults.
pub fn load(path: &Path) -> Settings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings file at {:?}, using defaults", path);
            return Settings::default();
        }
        Err(e) => {
            warn!("Cannot read settings {:?}: {}. Using defaults.", path, e);
            return Settings::default();
        }
    };

    let file = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(file)) => file,
        Ok(_) => {
            warn!("Settings file {:?} is not an object. Using defaults.", path);
            return Settings::default();
        }
        Err(e) => {
            warn!("Corrupt settings file {:?}: {}. Using defaults.", path, e);
            return Settings::default();
        }
    };

    merge_over_defaults(file)
}

/// Apply persisted keys one at a time, so a single wrong-typed value only
/// costs that key.
fn merge_over_defaults(file: Map<String, Value>) -> Settings {
    let defaults = Settings::default();
    let mut merged = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => return defaults,
    };

    for (key, value) in file {
        let previous = merged.insert(key.clone(), value);
        if let Err(e) = serde_json::from_value::<Settings>(Value::Object(merged.clone())) {
            warn!("Ignoring settings key {:?}: {}", key, e);
            match previous {
                Some(previous) => merged.insert(key, previous),
                None => merged.remove(&key),
            };
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
}

/// Write the whole record, overwriting any previous file.
pub fn try_save(path: &Path, settings: &Settings) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))?;

    info!("Settings saved to {:?}", path);
    Ok(())
}

/// Like [`try_save`], but a failure is only logged.
pub fn save(path: &Path, settings: &Settings) {
    if let Err(e) = try_save(path, settings) {
        error!("Failed to save settings: {}", e);
    }
}
