use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::core::settings::Settings;

/// Access token passed for offline play.
const OFFLINE_TOKEN: &str = "0";

/// Options record handed to the library's command builder.
///
/// Empty values are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub username: String,
    pub uuid: String,
    pub token: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jvm_arguments: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fullscreen: bool,
    pub game_directory: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_height: Option<u32>,
    pub launch_target: String,
}

impl LaunchOptions {
    pub fn from_settings(settings: &Settings, username: &str, game_dir: &Path) -> Self {
        Self {
            username: username.to_string(),
            uuid: offline_uuid(username),
            token: OFFLINE_TOKEN.to_string(),
            jvm_arguments: settings.effective_jvm_args(),
            fullscreen: settings.fullscreen,
            game_directory: game_dir.to_path_buf(),
            executable_path: settings.java_override().cloned(),
            resolution_width: None,
            resolution_height: None,
            launch_target: "minecraft".to_string(),
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        if width > 0 && height > 0 {
            self.resolution_width = Some(width);
            self.resolution_height = Some(height);
        }
        self
    }
}

/// Deterministic player UUID for offline play (UUIDv3 in the DNS namespace).
pub fn offline_uuid(username: &str) -> String {
    Uuid::new_v3(&Uuid::NAMESPACE_DNS, username.as_bytes()).to_string()
}
