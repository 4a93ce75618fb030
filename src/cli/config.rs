//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{ClassificationRule, Config};
use crate::services::assistant::find_model;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug, Default)]
pub struct ConfigSetArgs {
    /// Content root holding Sources/
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// HTTP server port
    #[arg(long)]
    port: Option<u16>,

    /// HTTP server host
    #[arg(long)]
    host: Option<String>,

    /// Classification rule (either, media_subfolder, direct)
    #[arg(long, value_name = "RULE")]
    rule: Option<String>,

    /// Idle timeout in seconds
    #[arg(long, value_name = "SECS")]
    idle_timeout: Option<u64>,

    /// Default assistant model
    #[arg(long)]
    model: Option<String>,

    /// Append-only chat log file
    #[arg(long, value_name = "FILE")]
    chat_log: Option<PathBuf>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            print_json(&config)
        } else {
            print!("{}", render_human_readable(&config));
            Ok(())
        }
    }
}

impl ConfigSetArgs {
    fn is_empty(&self) -> bool {
        self.root.is_none()
            && self.port.is_none()
            && self.host.is_none()
            && self.rule.is_none()
            && self.idle_timeout.is_none()
            && self.model.is_none()
            && self.chat_log.is_none()
    }

    /// Applies the given options to `config` without saving.
    fn apply(&self, config: &mut Config) -> CliResult<()> {
        if let Some(root) = &self.root {
            if !root.is_dir() {
                return Err(CliError::validation(format!(
                    "Content root does not exist: {}",
                    root.display()
                )));
            }
            config.paths.app_root.clone_from(root);
        }

        if let Some(port) = self.port {
            if port == 0 {
                return Err(CliError::validation("Port must be between 1 and 65535"));
            }
            config.server.port = port;
        }

        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(CliError::validation("Host cannot be empty"));
            }
            config.server.host = host.trim().to_string();
        }

        if let Some(rule) = &self.rule {
            config.scan.rule =
                ClassificationRule::parse(rule).map_err(|e| CliError::validation(e.to_string()))?;
        }

        if let Some(secs) = self.idle_timeout {
            config.timers.idle_timeout_secs = secs;
        }

        if let Some(model) = &self.model {
            if find_model(model).is_none() {
                return Err(CliError::validation(format!("Unknown model '{model}'")));
            }
            config.assistant.model.clone_from(model);
        }

        if let Some(path) = &self.chat_log {
            config.paths.chat_log = Some(path.clone());
        }

        config
            .validate()
            .map_err(|e| CliError::validation(e.to_string()))
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --root, --port, --host, --rule, --idle-timeout, --model, or --chat-log",
            ));
        }

        let mut config = Config::load().unwrap_or_default();
        self.apply(&mut config)?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}

/// Renders configuration for the terminal.
fn render_human_readable(config: &Config) -> String {
    let chat_log = config
        .paths
        .chat_log
        .as_ref()
        .map_or_else(|| "(memory only)".to_string(), |p| p.display().to_string());

    format!(
        "Vitrine Configuration
=====================

Paths:
  Content Root: {}
  Chat Log: {chat_log}

Scan:
  Rule: {}
  Max Depth: {}

Timers:
  Idle Timeout: {}s
  Session Warning: {}ms
  Session Reset: {}ms

Assistant:
  Model: {}
  History Limit: {}

Server:
  Address: {}:{}
",
        config.paths.app_root.display(),
        config.scan.rule.as_str(),
        config.scan.max_depth,
        config.timers.idle_timeout_secs,
        config.timers.session_warning_ms,
        config.timers.session_reset_ms,
        config.assistant.model,
        config.assistant.history_limit,
        config.server.host,
        config.server.port,
    )
}
