use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Serialization ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── XML ─────────────────────────────────────────────
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),

    // ── Versions / loaders ──────────────────────────────
    #[error("Could not find installed version for {0}")]
    VersionNotFound(String),

    // ── Mods ────────────────────────────────────────────
    #[error("Mod {0} is not listed as installed")]
    ModNotInstalled(String),

    #[error("No compatible file for {0}")]
    NoCompatibleFile(String),

    #[error("A download for {0} is already running")]
    DownloadInProgress(String),

    // ── Game process ────────────────────────────────────
    #[error("Game process exited with code {exit_code}")]
    GameProcess { exit_code: i32, output: String },

    #[error("Cannot start Java at {path:?}: {source}")]
    JavaExecution {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Control flow ────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LauncherError::Cancelled)
    }

    /// True for failures caused by talking to a remote service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::DownloadFailed { .. }
        )
    }
}
