// ─── Game launch ───
// One launch attempt: resolve and install the base version, install the
// loader, register a ledger profile, build the command through the external
// library and supervise the game process. Progress, state changes and game
// output are reported as `LaunchEvent`s.

pub mod events;
pub mod failure;
pub mod guard;
pub mod orchestrator;
pub mod process;

pub use events::{LaunchEvent, LaunchSink, LaunchState};
pub use failure::{FailureKind, FixAction, LaunchFailure};
pub use guard::InstallGuard;
pub use orchestrator::{launch, LaunchOutcome, LaunchRequest};
