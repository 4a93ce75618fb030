//! Kiosk branding: logo, background, palette and font.
//!
//! Branding lives in `<app_root>/Branding/config.json`. The file is taken as a
//! whole; a missing or malformed file falls back to the built-in dark theme.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::services::catalog::resolve_within;

/// Branding config file name inside the Branding folder.
pub const BRANDING_CONFIG_FILE: &str = "config.json";

/// Default background and primary surface color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#0A0E1A";

/// Default font family.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Stylesheet URL for the default font.
pub const DEFAULT_FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap";

/// How the background is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// `value` is a CSS color
    Color,
    /// `value` is an image file relative to the Branding folder
    Image,
}

/// Background fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    /// Color or image
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// Color value or image file name
    pub value: String,
}

/// Theme palette. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colors {
    /// Accent color for buttons and highlights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Accent color under the pointer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_hover: Option<String>,
    /// Page background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_primary: Option<String>,
    /// Panel and card background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_secondary: Option<String>,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_primary: Option<String>,
    /// Captions and secondary labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_secondary: Option<String>,
}

/// Web font.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    /// CSS font-family value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Stylesheet URL that provides the font
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Branding as read from `config.json`, plus resolved image paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingConfig {
    /// Logo file name relative to the Branding folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Background fill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    /// Palette
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Colors>,
    /// Font
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// Absolute logo path, set only when the file exists
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<PathBuf>,
    /// Absolute background image path, set only when the file exists
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub background_path: Option<PathBuf>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            logo: None,
            background: Some(Background {
                kind: BackgroundKind::Color,
                value: DEFAULT_BACKGROUND_COLOR.to_string(),
            }),
            colors: Some(Colors {
                primary: Some("#0066FF".to_string()),
                primary_hover: Some("#0052CC".to_string()),
                bg_primary: Some(DEFAULT_BACKGROUND_COLOR.to_string()),
                bg_secondary: Some("#151B2D".to_string()),
                text_primary: Some("#FFFFFF".to_string()),
                text_secondary: Some("#B0B8CC".to_string()),
            }),
            font: Some(Font {
                family: Some(DEFAULT_FONT_FAMILY.to_string()),
                url: Some(DEFAULT_FONT_URL.to_string()),
            }),
            logo_path: None,
            background_path: None,
        }
    }
}

impl BrandingConfig {
    /// Parses `config.json` content. Image paths are left unresolved.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Loads branding from a Branding folder.
    ///
    /// Never fails: a missing or malformed `config.json` gives the default
    /// theme, and images that do not exist are simply not resolved.
    #[must_use]
    pub fn load(branding_dir: &Path) -> Self {
        let config_path = branding_dir.join(BRANDING_CONFIG_FILE);

        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %config_path.display(), error = %e, "No branding config, using defaults");
                return Self::default();
            }
        };

        let mut config = match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "Malformed branding config, using defaults");
                return Self::default();
            }
        };

        config.resolve_images(branding_dir);
        config
    }

    /// Resolves logo and background image files against the Branding folder.
    pub fn resolve_images(&mut self, branding_dir: &Path) {
        self.logo_path = self
            .logo
            .as_deref()
            .and_then(|logo| resolve_image(branding_dir, logo));

        self.background_path = self
            .background
            .as_ref()
            .filter(|bg| bg.kind == BackgroundKind::Image && !bg.value.is_empty())
            .and_then(|bg| resolve_image(branding_dir, &bg.value));
    }
}

fn resolve_image(branding_dir: &Path, file: &str) -> Option<PathBuf> {
    let resolved = resolve_within(branding_dir, Path::new(file));
    if resolved.is_none() {
        warn!(file, "Branding image not found");
    }
    resolved
}
