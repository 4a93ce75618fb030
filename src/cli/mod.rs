//! CLI command handlers for Vitrine.
//!
//! Headless access to catalog scanning, content checks and configuration,
//! for kiosk operators and scripts.

pub mod check;
pub mod common;
pub mod config;
pub mod scan;

// Re-export types used by main.rs and tests
pub use check::CheckArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use scan::ScanArgs;
