//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    APP_DATA_DIR, BRANDING_DIR, COMPANY_INFO_DIR, CONFIG_DIR_ENV, DEFAULT_HISTORY_LIMIT,
    DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_SCAN_DEPTH, DEFAULT_SESSION_RESET_MS,
    DEFAULT_SESSION_WARNING_MS, SOURCES_DIR,
};

/// Which folders count as products.
///
/// Exactly one rule is active for a scan; the scanner never mixes rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    /// Media in the `Photos/` subfolder, or failing that, media directly in the folder
    #[default]
    Either,
    /// Only media inside the `Photos/` subfolder makes a product
    MediaSubfolder,
    /// Only media directly inside the folder makes a product
    Direct,
}

impl ClassificationRule {
    /// Parses the config/CLI spelling of a rule.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "either" => Ok(Self::Either),
            "media_subfolder" | "subfolder" => Ok(Self::MediaSubfolder),
            "direct" => Ok(Self::Direct),
            other => anyhow::bail!(
                "Unknown classification rule '{other}'. Expected either, media_subfolder, or direct"
            ),
        }
    }

    /// The config spelling of the rule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Either => "either",
            Self::MediaSubfolder => "media_subfolder",
            Self::Direct => "direct",
        }
    }
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Content root holding `Sources/`, `Branding/`, `CompanyInfo/` and `api-keys.txt`
    pub app_root: PathBuf,
    /// Append-only chat log (JSON lines). `None` keeps chat history in memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_log: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            app_root: PathBuf::from("app"),
            chat_log: None,
        }
    }
}

impl PathConfig {
    /// `<app_root>/Sources`
    #[must_use]
    pub fn sources_dir(&self) -> PathBuf {
        self.app_root.join(SOURCES_DIR)
    }

    /// `<app_root>/Branding`
    #[must_use]
    pub fn branding_dir(&self) -> PathBuf {
        self.app_root.join(BRANDING_DIR)
    }

    /// `<app_root>/CompanyInfo`
    #[must_use]
    pub fn company_info_dir(&self) -> PathBuf {
        self.app_root.join(COMPANY_INFO_DIR)
    }
}

/// Catalog scanning configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Product classification rule
    #[serde(default)]
    pub rule: ClassificationRule,
    /// Deepest directory level below Sources that is scanned
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_SCAN_DEPTH
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rule: ClassificationRule::default(),
            max_depth: default_max_depth(),
        }
    }
}

/// Idle and session timeout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds without activity before the idle takeover.
    /// `Sources/ASSETS/Idle/idle_time.txt` overrides this when present.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Milliseconds without activity before the session warning
    #[serde(default = "default_session_warning_ms")]
    pub session_warning_ms: u64,
    /// Milliseconds without activity before the session is reset
    #[serde(default = "default_session_reset_ms")]
    pub session_reset_ms: u64,
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_session_warning_ms() -> u64 {
    DEFAULT_SESSION_WARNING_MS
}

fn default_session_reset_ms() -> u64 {
    DEFAULT_SESSION_RESET_MS
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            session_warning_ms: default_session_warning_ms(),
            session_reset_ms: default_session_reset_ms(),
        }
    }
}

impl TimerConfig {
    /// Session warning stage as a duration.
    #[must_use]
    pub const fn session_warning(&self) -> Duration {
        Duration::from_millis(self.session_warning_ms)
    }

    /// Session reset stage as a duration.
    #[must_use]
    pub const fn session_reset(&self) -> Duration {
        Duration::from_millis(self.session_reset_ms)
    }
}

/// Assistant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Model identifier from the model catalog (e.g., "gemini-2.5-pro")
    #[serde(default = "default_model")]
    pub model: String,
    /// Number of prior messages sent along with each question
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            history_limit: default_history_limit(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - `$VITRINE_CONFIG_DIR/config.toml` when the variable is set
/// - Linux: `~/.config/Vitrine/config.toml`
/// - macOS: `~/Library/Application Support/Vitrine/config.toml`
/// - Windows: `%APPDATA%\Vitrine\config.toml`
///
/// # Validation
///
/// - `session_warning_ms` must be below `session_reset_ms`
/// - `idle_timeout_secs` and `max_depth` must be non-zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Scanner settings
    #[serde(default)]
    pub scan: ScanConfig,
    /// Idle and session timers
    #[serde(default)]
    pub timers: TimerConfig,
    /// Assistant settings
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default config pointing at the given content root.
    #[must_use]
    pub fn with_app_root(app_root: impl Into<PathBuf>) -> Self {
        let mut config = Self::new();
        config.paths.app_root = app_root.into();
        config
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// Honors `VITRINE_CONFIG_DIR`, otherwise the platform config directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DATA_DIR);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit file path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit file path.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.timers.idle_timeout_secs == 0 {
            anyhow::bail!("Idle timeout must be at least one second");
        }

        if self.timers.session_warning_ms >= self.timers.session_reset_ms {
            anyhow::bail!(
                "Session warning ({} ms) must come before session reset ({} ms)",
                self.timers.session_warning_ms,
                self.timers.session_reset_ms
            );
        }

        if self.scan.max_depth == 0 {
            anyhow::bail!("Scan depth must be at least 1");
        }

        if self.assistant.model.trim().is_empty() {
            anyhow::bail!("Assistant model cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.paths.app_root, PathBuf::from("app"));
        assert_eq!(config.paths.chat_log, None);
        assert_eq!(config.scan.rule, ClassificationRule::Either);
        assert_eq!(config.scan.max_depth, 32);
        assert_eq!(config.timers.idle_timeout_secs, 60);
        assert_eq!(config.timers.session_warning_ms, 45_000);
        assert_eq!(config.timers.session_reset_ms, 60_000);
        assert_eq!(config.assistant.history_limit, 10);
        assert_eq!(config.server.port, 3001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_content_paths() {
        let config = Config::with_app_root("/srv/kiosk");
        assert_eq!(config.paths.sources_dir(), PathBuf::from("/srv/kiosk/Sources"));
        assert_eq!(config.paths.branding_dir(), PathBuf::from("/srv/kiosk/Branding"));
        assert_eq!(
            config.paths.company_info_dir(),
            PathBuf::from("/srv/kiosk/CompanyInfo")
        );
    }

    #[test]
    fn test_validate_rejects_warning_after_reset() {
        let mut config = Config::new();
        config.timers.session_warning_ms = 60_000;
        config.timers.session_reset_ms = 60_000;
        assert!(config.validate().is_err());

        config.timers.session_warning_ms = 10_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::new();
        config.timers.idle_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.scan.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::with_app_root(temp_dir.path());
        config.scan.rule = ClassificationRule::Direct;
        config.timers.idle_timeout_secs = 120;
        config.server.port = 8080;

        config.save_to(&config_file).unwrap();
        assert!(config_file.exists());
        assert!(!config_file.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(
            &config_file,
            "[paths]\napp_root = \"/srv/kiosk\"\n\n[scan]\nrule = \"media_subfolder\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded.paths.app_root, PathBuf::from("/srv/kiosk"));
        assert_eq!(loaded.scan.rule, ClassificationRule::MediaSubfolder);
        assert_eq!(loaded.scan.max_depth, 32);
        assert_eq!(loaded.timers, TimerConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[timers]\nsession_warning_ms = 90000\n").unwrap();

        assert!(Config::load_from(&config_file).is_err());
    }

    #[test]
    fn test_classification_rule_parse() {
        assert_eq!(ClassificationRule::parse("either").unwrap(), ClassificationRule::Either);
        assert_eq!(
            ClassificationRule::parse("Media-Subfolder").unwrap(),
            ClassificationRule::MediaSubfolder
        );
        assert_eq!(ClassificationRule::parse("direct").unwrap(), ClassificationRule::Direct);
        assert!(ClassificationRule::parse("sometimes").is_err());

        for rule in [
            ClassificationRule::Either,
            ClassificationRule::MediaSubfolder,
            ClassificationRule::Direct,
        ] {
            assert_eq!(ClassificationRule::parse(rule.as_str()).unwrap(), rule);
        }
    }
}
