//! PSA Core - Backend logic for the weekly PSA asset tool
//!
//! This crate contains all business logic with zero UI dependencies:
//! clip listing and selection, named stitch variants, the copy/stitch
//! run pipeline and the background worker that drives it. It can be used
//! by a GUI front end or the bundled CLI.

pub mod clips;
pub mod config;
pub mod copy;
pub mod destination;
pub mod logging;
pub mod naming;
pub mod orchestrator;
pub mod stitch;
pub mod updates;
pub mod variants;
pub mod worker;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
