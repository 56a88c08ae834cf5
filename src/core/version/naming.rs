// ─── Version naming ───
// Helpers for the version ids produced by the external library, e.g.
// `1.20.1`, `1.20.1-forge-47.2.0`, `fabric-loader-0.15.7-1.20.1`.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::loaders::LoaderType;

fn game_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("valid version regex"))
}

/// Underlying game version of an installed or selected version id.
///
/// Fabric ids carry the game version last; everything else leads with it.
/// Ids without a recognizable version are returned unchanged.
pub fn get_base_version(version_id: &str) -> String {
    let re = game_version_regex();

    if version_id.to_lowercase().contains("fabric") {
        if let Some(last) = re.find_iter(version_id).last() {
            return last.as_str().to_string();
        }
    }

    match re.find(version_id) {
        Some(m) if m.start() == 0 => m.as_str().to_string(),
        _ => version_id.to_string(),
    }
}

/// Loader family of a version id.
pub fn version_type(version_id: &str) -> LoaderType {
    let lower = version_id.to_lowercase();
    if lower.contains("fabric") {
        LoaderType::Fabric
    } else if lower.contains("forge") {
        LoaderType::Forge
    } else {
        LoaderType::Vanilla
    }
}

/// Sort key for dotted versions; non-numeric parts count as 0.
pub fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Keep only the first `<game>-<build>` entry per game version.
///
/// Forge lists builds newest first, so this yields the latest build of each.
pub fn latest_per_game_version(raw_versions: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw_versions
        .iter()
        .filter_map(|version| {
            let (game, _) = version.split_once('-')?;
            seen.insert(game.to_string()).then(|| version.clone())
        })
        .collect()
}

/// Whether the selectable `version_id` for `loader` is already installed.
pub fn is_installed(loader: LoaderType, version_id: &str, installed_ids: &[String]) -> bool {
    match loader {
        LoaderType::Forge => {
            let Some((game, build)) = version_id.split_once('-') else {
                return false;
            };
            installed_ids.iter().any(|id| {
                id.contains("forge") && id.starts_with(game) && id.ends_with(build)
            })
        }
        LoaderType::Fabric => installed_ids
            .iter()
            .any(|id| id.contains("fabric-loader") && id.contains(version_id)),
        LoaderType::Vanilla => installed_ids.iter().any(|id| id == version_id),
    }
}

/// Human readable size, e.g. `1.5 MB`.
pub fn format_size(size_bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = size_bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    format!("{} {}", text, UNITS[unit])
}
