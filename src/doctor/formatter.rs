//! Output formatting for content check results.
//!
//! # Example
//!
//! ```rust
//! use vitrine::doctor::{CheckFormatter, ContentChecker};
//! use std::path::Path;
//!
//! let results = ContentChecker::default().check_all(Path::new("/path/to/app"));
//! let output = CheckFormatter::new().format_results(&results);
//! println!("{}", output);
//! ```

use crate::doctor::{CheckLevel, CheckResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Terminal,
    /// Machine-readable JSON output
    Json,
}

/// JSON output structure for check results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// "ok", "warning" or "error": the worst level found
    pub status: String,
    /// Number of checks that passed
    pub passed: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of errors
    pub errors: usize,
    /// Every check, in run order
    pub checks: Vec<JsonCheck>,
}

/// JSON representation of a single check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCheck {
    /// Check name
    pub name: String,
    /// "ok", "warning" or "error"
    pub level: String,
    /// One-line summary
    pub message: String,
    /// Offending paths or extra notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Formatter for check results.
pub struct CheckFormatter {
    format: OutputFormat,
}

impl Default for CheckFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckFormatter {
    /// Creates a formatter with terminal output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format: OutputFormat::Terminal,
        }
    }

    /// Creates a formatter for the given output format.
    #[must_use]
    pub fn with_format(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats check results for display or parsing.
    pub fn format_results(&self, results: &[CheckResult]) -> String {
        match self.format {
            OutputFormat::Terminal => Self::format_terminal(results),
            OutputFormat::Json => Self::format_json(results),
        }
    }

    fn format_terminal(results: &[CheckResult]) -> String {
        let mut output = String::new();

        output.push_str("Kiosk Content Check\n");
        output.push_str("═══════════════════\n\n");

        for result in results {
            let (symbol, status_text) = match result.level {
                CheckLevel::Ok => ("✓", "OK"),
                CheckLevel::Warning => ("⚠", "WARNING"),
                CheckLevel::Error => ("✗", "ERROR"),
            };

            // Format: ✓ Sources ............. OK
            let name_width: usize = 20;
            let dots = ".".repeat(name_width.saturating_sub(result.name.len()));
            let _ = writeln!(output, "{symbol} {}{dots} {status_text}", result.name);
            let _ = writeln!(output, "    {}", result.message);
            for detail in &result.details {
                let _ = writeln!(output, "      - {detail}");
            }
        }

        let (passed, warnings, errors) = count(results);
        output.push('\n');
        let _ = writeln!(
            output,
            "Summary: {passed} passed, {warnings} warnings, {errors} errors"
        );
        if errors > 0 {
            output.push_str("Fix the errors above before starting the kiosk.\n");
        }

        output
    }

    fn format_json(results: &[CheckResult]) -> String {
        let (passed, warnings, errors) = count(results);
        let worst = results
            .iter()
            .map(|r| r.level)
            .max_by_key(|level| match level {
                CheckLevel::Ok => 0,
                CheckLevel::Warning => 1,
                CheckLevel::Error => 2,
            })
            .unwrap_or(CheckLevel::Ok);

        let output = JsonOutput {
            status: worst.as_str().to_string(),
            passed,
            warnings,
            errors,
            checks: results
                .iter()
                .map(|r| JsonCheck {
                    name: r.name.clone(),
                    level: r.level.as_str().to_string(),
                    message: r.message.clone(),
                    details: r.details.clone(),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

fn count(results: &[CheckResult]) -> (usize, usize, usize) {
    let of = |level| results.iter().filter(|r| r.level == level).count();
    (
        of(CheckLevel::Ok),
        of(CheckLevel::Warning),
        of(CheckLevel::Error),
    )
}
