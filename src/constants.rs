//! Application-wide constants.
//!
//! This module defines the application identity and the names that make up the
//! content folder contract (sidecar files, skip list, media extensions).

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Vitrine";

/// The binary name of the application (used in command examples, lowercase).
pub const APP_BINARY_NAME: &str = "vitrine";

/// The directory name for application data (config, chat log).
///
/// Used in platform-specific paths:
/// - Linux: `~/.config/{APP_DATA_DIR}/`
/// - macOS: `~/Library/Application Support/{APP_DATA_DIR}/`
/// - Windows: `%APPDATA%\{APP_DATA_DIR}\`
pub const APP_DATA_DIR: &str = "Vitrine";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "VITRINE_CONFIG_DIR";

// ============================================================================
// Content root layout
// ============================================================================

/// Folder below the app root holding the catalog.
pub const SOURCES_DIR: &str = "Sources";

/// Folder below the app root holding `config.json` and branding images.
pub const BRANDING_DIR: &str = "Branding";

/// Folder below the app root scanned as the company product.
pub const COMPANY_INFO_DIR: &str = "CompanyInfo";

/// API key file in the app root.
pub const API_KEYS_FILE: &str = "api-keys.txt";

/// Idle assets, relative to the Sources folder.
pub const IDLE_ASSETS_PATH: [&str; 2] = ["ASSETS", "Idle"];

/// Ambient video played while idle.
pub const IDLE_VIDEO_FILE: &str = "idle.mp4";

/// Single integer (seconds) overriding the idle timeout.
pub const IDLE_TIME_FILE: &str = "idle_time.txt";

// ============================================================================
// Per-folder sidecars
// ============================================================================

/// Display name override.
pub const NAME_FILE: &str = "name.txt";

/// `filename|caption|description` lines.
pub const CAPTIONS_FILE: &str = "captions.txt";

/// Free-form context handed to the assistant.
pub const AI_CONTEXT_FILE: &str = "ai.txt";

/// Long-form product description.
pub const DESCRIPTION_DOCX_FILE: &str = "product.docx";

/// Designated media subfolder of a product.
pub const MEDIA_SUBFOLDER: &str = "Photos";

/// Thumbnail candidates, first match wins.
pub const THUMBNAIL_CANDIDATES: &[&str] = &["thumb.png", "thumb.jpg", "thumb.jpeg"];

/// Company logo candidates inside the company folder, first match wins.
pub const LOGO_CANDIDATES: &[&str] = &["logo.png", "logo.jpg", "logo.jpeg"];

/// Folders that are never categories or products, at any depth.
pub const SKIP_FOLDERS: &[&str] = &["Photos", "ASSETS", "Idle", "Videos", "Images", "CEGINFO"];

/// Recognized image extensions (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Recognized video extensions (lowercase, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi"];

// ============================================================================
// Defaults
// ============================================================================

/// Maximum directory depth below Sources that the scanner descends into.
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 32;

/// Idle timeout when neither config nor `idle_time.txt` say otherwise.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

/// Session warning stage.
pub const DEFAULT_SESSION_WARNING_MS: u64 = 45_000;

/// Session hard reset stage.
pub const DEFAULT_SESSION_RESET_MS: u64 = 60_000;

/// Number of prior messages handed to the assistant.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
