//! Vitrine - kiosk catalog tools
//!
//! Scans a kiosk content root, checks it for problems, and manages the saved
//! configuration. The HTTP server lives in the `vitrine-web` binary.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::cli::{CheckArgs, CliResult, ConfigArgs, ScanArgs};
use vitrine::constants::APP_BINARY_NAME;

/// Vitrine - folder-based product catalog for touchscreen kiosks
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the content root and print the catalog
    Scan(ScanArgs),
    /// Check the content root for missing or malformed files
    Check(CheckArgs),
    /// Show or change the saved configuration
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Scan(args) => args.execute(),
            Self::Check(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = cli.command.execute() {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code.code());
    }
}
