// ─── Mods ───
// Local mod archives, the installed-mods registry and the install / delete /
// toggle actions driven from the catalog.

pub mod manager;
pub mod manifest;
pub mod registry;
pub mod scan;

pub use manager::{delete_mod, install_mod, set_mod_enabled, DownloadManager, ModEvent};
pub use manifest::{mod_id_from_jar, read_metadata, ModMetadata};
pub use registry::{InstalledModRecord, InstalledModsRegistry};
pub use scan::{scan_local, LocalMod};
