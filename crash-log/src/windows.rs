//! The 32-bit Windows implementation, registering a top level unhandled
//! exception filter and querying PSAPI for the loaded modules.

mod psapi;
mod state;

pub use psapi::ProcessModules;
pub(crate) use state::install;
