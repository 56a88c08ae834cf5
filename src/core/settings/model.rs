use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::loaders::LoaderType;

/// G1 collector tuning applied when `use_g1gc` is enabled.
const G1GC_FLAGS: &[&str] = &[
    "-XX:+UseG1GC",
    "-XX:+ParallelRefProcEnabled",
    "-XX:MaxGCPauseMillis=200",
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+DisableExplicitGC",
    "-XX:+AlwaysPreTouch",
    "-XX:G1NewSizePercent=30",
    "-XX:G1MaxNewSizePercent=40",
    "-XX:G1HeapRegionSize=8M",
    "-XX:G1ReservePercent=20",
    "-XX:G1HeapWastePercent=5",
    "-XX:G1MixedGCCountTarget=4",
    "-XX:InitiatingHeapOccupancyPercent=15",
    "-XX:G1MixedGCLiveThresholdPercent=90",
    "-XX:G1RSetUpdatingPauseTimePercent=5",
    "-XX:SurvivorRatio=32",
    "-XX:+PerfDisableSharedMem",
    "-XX:MaxTenuringThreshold=1",
];

/// Saved window position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// User settings persisted as `launcher_settings.json`.
///
/// Every field has a default, so a file missing any subset of keys still
/// deserializes; keys present on disk always win. Keys this version does not
/// know about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: String,
    pub theme: String,
    pub accent_color: String,
    #[serde(rename = "memory")]
    pub memory_gb: u32,
    pub fullscreen: bool,
    #[serde(rename = "close_launcher")]
    pub close_on_launch: bool,
    pub last_username: String,
    pub use_g1gc: bool,
    pub version_type: LoaderType,
    pub last_version: String,
    pub jvm_args: String,
    pub java_path: Option<PathBuf>,
    pub window_geometry: Option<WindowGeometry>,
    pub last_tab: u32,
    #[serde(rename = "clientToken")]
    pub client_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "ru".to_string(),
            theme: "dark".to_string(),
            accent_color: "#1DB954".to_string(),
            memory_gb: 4,
            fullscreen: false,
            close_on_launch: true,
            last_username: String::new(),
            use_g1gc: false,
            version_type: LoaderType::Vanilla,
            last_version: String::new(),
            jvm_args: String::new(),
            java_path: None,
            window_geometry: None,
            last_tab: 0,
            client_token: Uuid::new_v4().simple().to_string(),
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Java override, treating an empty path as "auto".
    pub fn java_override(&self) -> Option<&PathBuf> {
        self.java_path
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Free-form JVM arguments split on whitespace.
    pub fn jvm_arguments(&self) -> Vec<String> {
        self.jvm_args
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Heap flags derived from the memory setting, plus G1 tuning when enabled.
    pub fn memory_flags(&self) -> Vec<String> {
        let mut flags = vec![
            format!("-Xmx{}G", self.memory_gb),
            format!("-Xms{}G", self.memory_gb),
        ];
        if self.use_g1gc {
            flags.extend(G1GC_FLAGS.iter().map(|flag| flag.to_string()));
        }
        flags
    }

    /// Heap flags followed by the user's own arguments.
    pub fn effective_jvm_args(&self) -> Vec<String> {
        let mut args = self.memory_flags();
        args.extend(self.jvm_arguments());
        args
    }
}
