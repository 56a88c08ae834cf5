pub mod manager;
pub mod naming;
pub mod remote;

pub use manager::{
    available_versions, delete_version, display_name, directory_size, group_installed, scan_installed,
    selectable_versions, spawn_size_scan, version_dir_names, InstalledGroup,
};
pub use naming::{
    format_size, get_base_version, is_installed, latest_per_game_version, version_key,
    version_type,
};
pub use remote::VersionLists;
