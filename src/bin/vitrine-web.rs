//! Vitrine Web Server Binary
//!
//! Serves the catalog, media files and the kiosk state machine over HTTP
//! for the touchscreen frontend.
//!
//! # Usage
//!
//! ```bash
//! # Start with the saved configuration (port 3001 by default)
//! vitrine-web
//!
//! # Serve a specific content root on another port
//! vitrine-web --port 8080 --root /srv/kiosk
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::config::Config;
use vitrine::web;

/// Vitrine Web Server - REST API for the kiosk frontend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on. Defaults to the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to. Defaults to the configured host
    #[arg(long)]
    host: Option<String>,

    /// Content root holding Sources/, Branding/ and CompanyInfo/
    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(root) = args.root {
        config.paths.app_root = root;
    }

    info!("Content root: {}", config.paths.app_root.display());

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context(format!("Invalid listen address {host}:{port}"))?;

    web::run_server(config, addr).await
}
