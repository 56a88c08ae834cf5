// ─── Mod manifests ───
// Metadata embedded in mod archives: `fabric.mod.json` for Fabric mods and
// `META-INF/mods.toml` for Forge mods.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

const FABRIC_MANIFEST: &str = "fabric.mod.json";
const FORGE_MANIFEST: &str = "META-INF/mods.toml";
const UNKNOWN: &str = "Unknown";

/// What could be recovered from a mod archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModMetadata {
    pub name: String,
    pub version: String,
    pub game_version: String,
    pub mod_id: Option<String>,
    pub author: String,
    pub project_id: Option<String>,
    pub icon_path: Option<String>,
    #[serde(skip)]
    pub icon_data: Option<Vec<u8>>,
}

impl ModMetadata {
    /// Placeholder used when the archive has no readable manifest.
    pub fn fallback(file_name: &str) -> Self {
        Self {
            name: file_name.to_string(),
            version: UNKNOWN.to_string(),
            game_version: UNKNOWN.to_string(),
            mod_id: None,
            author: UNKNOWN.to_string(),
            project_id: None,
            icon_path: None,
            icon_data: None,
        }
    }
}

// ── fabric.mod.json ─────────────────────────────────────

#[derive(Deserialize)]
struct FabricModJson {
    id: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    depends: HashMap<String, Value>,
    #[serde(default)]
    authors: Vec<FabricAuthor>,
    #[serde(default)]
    custom: Value,
    icon: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FabricAuthor {
    Name(String),
    Person { name: String },
}

impl FabricAuthor {
    fn name(&self) -> &str {
        match self {
            FabricAuthor::Name(name) | FabricAuthor::Person { name } => name,
        }
    }
}

impl FabricModJson {
    fn modrinth_project_id(&self) -> Option<String> {
        self.custom
            .pointer("/modrinth/project_id")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// `icon` is either a path or a `{size: path}` map; take the largest.
    fn icon_path(&self) -> Option<String> {
        match self.icon.as_ref()? {
            Value::String(path) => Some(path.clone()),
            Value::Object(sizes) => sizes
                .iter()
                .max_by_key(|(size, _)| size.parse::<u32>().unwrap_or(0))
                .and_then(|(_, path)| path.as_str())
                .map(str::to_string),
            _ => None,
        }
    }

    fn game_version(&self) -> Option<String> {
        match self.depends.get("minecraft")? {
            Value::String(range) if range != "*" => Some(range.clone()),
            Value::Array(ranges) => {
                let ranges: Vec<&str> = ranges.iter().filter_map(Value::as_str).collect();
                (!ranges.is_empty()).then(|| ranges.join(", "))
            }
            _ => None,
        }
    }
}

// ── mods.toml ───────────────────────────────────────────

#[derive(Deserialize)]
struct ModsToml {
    #[serde(default)]
    mods: Vec<ModsTomlEntry>,
    #[serde(default)]
    dependencies: HashMap<String, Vec<ModsTomlDependency>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModsTomlEntry {
    mod_id: Option<String>,
    display_name: Option<String>,
    version: Option<String>,
    authors: Option<toml::Value>,
    logo_file: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModsTomlDependency {
    mod_id: String,
    version_range: Option<String>,
}

impl ModsTomlEntry {
    fn authors(&self) -> Option<String> {
        match self.authors.as_ref()? {
            toml::Value::String(authors) => Some(authors.clone()),
            toml::Value::Array(authors) => Some(
                authors
                    .iter()
                    .filter_map(toml::Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

// ── Reading ─────────────────────────────────────────────

type Archive = zip::ZipArchive<std::fs::File>;

fn open_archive(path: &Path) -> LauncherResult<Archive> {
    let file = std::fs::File::open(path).map_err(|e| LauncherError::io(path, e))?;
    Ok(zip::ZipArchive::new(file)?)
}

fn read_entry(archive: &mut Archive, name: &str) -> LauncherResult<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

fn parse_fabric(json: &[u8]) -> LauncherResult<FabricModJson> {
    Ok(serde_json::from_slice(json)?)
}

fn parse_forge(toml_bytes: &[u8]) -> LauncherResult<ModsToml> {
    let text = String::from_utf8_lossy(toml_bytes);
    Ok(toml::from_str(&text)?)
}

/// Read the manifest of the archive at `path`.
///
/// An archive without a known manifest yields the fallback metadata; an
/// unreadable archive or manifest is an error.
pub fn read_metadata(path: &Path) -> LauncherResult<ModMetadata> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut metadata = ModMetadata::fallback(&file_name);
    let mut archive = open_archive(path)?;

    if let Some(json) = read_entry(&mut archive, FABRIC_MANIFEST)? {
        let manifest = parse_fabric(&json)?;

        if let Some(name) = &manifest.name {
            metadata.name = name.clone();
        }
        if let Some(version) = &manifest.version {
            metadata.version = version.clone();
        }
        if let Some(game_version) = manifest.game_version() {
            metadata.game_version = game_version;
        }
        if !manifest.authors.is_empty() {
            metadata.author = manifest
                .authors
                .iter()
                .map(FabricAuthor::name)
                .collect::<Vec<_>>()
                .join(", ");
        }
        metadata.mod_id = manifest.id.clone();
        metadata.project_id = manifest.modrinth_project_id();
        metadata.icon_path = manifest.icon_path();
    } else if let Some(toml_bytes) = read_entry(&mut archive, FORGE_MANIFEST)? {
        let manifest = parse_forge(&toml_bytes)?;

        if let Some(entry) = manifest.mods.first() {
            if let Some(name) = &entry.display_name {
                metadata.name = name.clone();
            }
            if let Some(version) = &entry.version {
                metadata.version = version.clone();
            }
            if let Some(author) = entry.authors() {
                metadata.author = author;
            }
            metadata.mod_id = entry.mod_id.clone();
            metadata.icon_path = entry.logo_file.clone();

            let range = entry
                .mod_id
                .as_ref()
                .and_then(|id| manifest.dependencies.get(id))
                .and_then(|deps| deps.iter().find(|d| d.mod_id == "minecraft"))
                .and_then(|dep| dep.version_range.as_deref());
            if let Some(range) = range {
                metadata.game_version = range
                    .trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'))
                    .to_string();
            }
        }
    }

    if let Some(icon_path) = metadata.icon_path.clone() {
        match read_entry(&mut archive, &icon_path) {
            Ok(Some(bytes)) => metadata.icon_data = Some(bytes),
            Ok(None) => metadata.icon_path = None,
            Err(e) => warn!("Could not read icon {} from {}: {}", icon_path, file_name, e),
        }
    }

    Ok(metadata)
}

/// Catalog project id (or, failing that, the mod id) declared by the
/// archive at `path`. Unreadable archives are logged and yield `None`.
pub fn mod_id_from_jar(path: &Path) -> Option<String> {
    let read = || -> LauncherResult<Option<String>> {
        let mut archive = open_archive(path)?;
        if let Some(json) = read_entry(&mut archive, FABRIC_MANIFEST)? {
            let manifest = parse_fabric(&json)?;
            return Ok(manifest.modrinth_project_id().or(manifest.id));
        }
        if let Some(toml_bytes) = read_entry(&mut archive, FORGE_MANIFEST)? {
            let manifest = parse_forge(&toml_bytes)?;
            return Ok(manifest.mods.into_iter().next().and_then(|m| m.mod_id));
        }
        Ok(None)
    };

    read().unwrap_or_else(|e| {
        warn!("Could not read mod ID from {:?}: {}", path.file_name(), e);
        None
    })
}
