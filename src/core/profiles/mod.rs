pub mod ledger;

pub use ledger::{add_profile, ensure_initialized, read_ledger, Profile, ProfileLedger};
