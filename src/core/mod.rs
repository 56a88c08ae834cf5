// ─── Hru Hru Launcher Core ───
// Non-UI backend of a launcher for vanilla, Forge and Fabric game clients.
//
// Architecture:
//   core/
//     settings/    Persisted user preferences + memory advice
//     profiles/    launcher_profiles.json ledger
//     library/     Seam to the external install/launch library
//     version/     Version naming, ordering and on-disk management
//     loaders/     Vanilla, Forge and Fabric install strategies
//     launch/      Launch state machine + game process supervision
//     downloader/  Streaming downloads with SHA-1 validation
//     catalog/     Modrinth v2 client
//     mods/        Local mod scanning, registry, downloads
//     updater      Latest-release check and download
//     state/       Session state handed to the shell

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod http;
pub mod launch;
pub mod library;
pub mod loaders;
pub mod mods;
pub mod paths;
pub mod profiles;
pub mod settings;
pub mod state;
pub mod updater;
pub mod version;

#[cfg(test)]
pub mod test_support;
