//! Content checking for a kiosk content root.
//!
//! This module checks that the folders, sidecars and settings the kiosk reads
//! are present and well-formed.

pub mod checker;
pub mod formatter;

// Re-export checker types
pub use checker::{CheckLevel, CheckResult, ContentChecker};
pub use formatter::{CheckFormatter, OutputFormat};
