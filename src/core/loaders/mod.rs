// ─── Loader strategies ───
// One `LoaderInstaller` per loader family, dispatched through the
// `Installer` enum. Each one makes sure its loader is installed through the
// external library and answers with the version id that should be launched.

pub mod context;
pub mod fabric;
pub mod forge;
pub mod installer;
pub mod vanilla;

use serde::{Deserialize, Serialize};

pub use context::InstallContext;
pub use installer::{Installer, LoaderInstaller};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    #[default]
    Vanilla,
    Forge,
    Fabric,
}

impl LoaderType {
    pub fn is_modded(self) -> bool {
        !matches!(self, LoaderType::Vanilla)
    }
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Vanilla => write!(f, "vanilla"),
            LoaderType::Forge => write!(f, "forge"),
            LoaderType::Fabric => write!(f, "fabric"),
        }
    }
}
