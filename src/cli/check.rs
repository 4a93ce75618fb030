//! Check command for content diagnostics.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::doctor::{CheckFormatter, CheckLevel, ContentChecker, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// Check a content root for missing or malformed files
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Content root (folder holding Sources/). Defaults to the configured root
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config(self.root.as_deref())?;

        let checker = ContentChecker::from_config(&config.scan);
        let results = checker.check_all(&config.paths.app_root);

        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Terminal
        };
        let output = CheckFormatter::with_format(format).format_results(&results);
        println!("{output}");

        if results.iter().any(|r| r.level == CheckLevel::Error) {
            Err(CliError::validation("Content check found errors"))
        } else {
            Ok(())
        }
    }
}
