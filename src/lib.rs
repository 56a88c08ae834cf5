pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::state::AppState;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hruhru_lib=debug"));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::info!("Hru Hru Launcher core {} starting", env!("CARGO_PKG_VERSION"));
    }
}
