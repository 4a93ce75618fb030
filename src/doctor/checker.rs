//! Content checks for a kiosk content root.
//!
//! This module inspects an `app_root` the way the kiosk will read it and
//! reports what is missing or malformed before the kiosk goes live.
//!
//! # Example
//!
//! ```rust
//! use vitrine::doctor::{CheckLevel, ContentChecker};
//! use std::path::Path;
//!
//! let checker = ContentChecker::default();
//! let results = checker.check_all(Path::new("/path/to/app"));
//!
//! for result in &results {
//!     match result.level {
//!         CheckLevel::Ok => println!("✓ {}: {}", result.name, result.message),
//!         CheckLevel::Warning => println!("⚠ {}: {}", result.name, result.message),
//!         CheckLevel::Error => println!("✗ {}: {}", result.name, result.message),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! Checks never fail themselves: anything that cannot be read is reported as
//! a warning or error result.

use std::fs;
use std::path::Path;

use crate::branding::{BrandingConfig, BRANDING_CONFIG_FILE};
use crate::config::{Config, ScanConfig};
use crate::constants::{
    API_KEYS_FILE, IDLE_ASSETS_PATH, IDLE_TIME_FILE, IDLE_VIDEO_FILE, NAME_FILE,
};
use crate::models::Category;
use crate::scanner::Scanner;
use crate::services::catalog::{load_company_info, load_company_logo};
use crate::services::ApiKeys;

/// Severity of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    /// Nothing to fix
    Ok,
    /// The kiosk works, but something looks unfinished
    Warning,
    /// The kiosk will not show what it should
    Error,
}

impl CheckLevel {
    /// Lowercase name used in JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Check name (e.g., "Sources", "Thumbnails")
    pub name: String,
    /// Severity
    pub level: CheckLevel,
    /// One-line summary
    pub message: String,
    /// Affected folders or files, one per entry
    pub details: Vec<String>,
}

impl CheckResult {
    /// Creates a result with no details.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        level: CheckLevel,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            message: message.into(),
            details,
        }
    }

    /// A passing check.
    #[must_use]
    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckLevel::Ok, message, Vec::new())
    }

    /// A check that found something worth fixing.
    #[must_use]
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckLevel::Warning, message, Vec::new())
    }

    /// A check that found broken content.
    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckLevel::Error, message, Vec::new())
    }

    /// Attaches details, one line each.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Checker for a kiosk content root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentChecker {
    scanner: Scanner,
}

impl ContentChecker {
    /// Creates a checker that scans with the given scanner.
    #[must_use]
    pub const fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }

    /// Creates a checker from the `[scan]` config section.
    #[must_use]
    pub const fn from_config(config: &ScanConfig) -> Self {
        Self::new(Scanner::from_config(config))
    }

    /// Runs every check against a content root.
    ///
    /// # Arguments
    ///
    /// * `app_root` - Folder holding Sources, CompanyInfo and Branding
    ///
    /// # Returns
    ///
    /// One result per check, in a fixed order.
    pub fn check_all(&self, app_root: &Path) -> Vec<CheckResult> {
        let paths = Config::with_app_root(app_root).paths;
        let sources = paths.sources_dir();

        let mut results = vec![Self::check_sources(&sources)];
        if sources.is_dir() {
            let categories = self.scanner.scan_sources(&sources);
            results.push(Self::check_catalog(&categories));
            results.push(Self::check_names(&categories));
            results.push(Self::check_thumbnails(&categories));
        }
        results.push(Self::check_company(&paths.company_info_dir()));
        results.push(Self::check_idle(&sources));
        results.push(Self::check_branding(&paths.branding_dir()));
        results.push(Self::check_api_keys(app_root));
        results
    }

    /// The Sources folder must exist.
    pub fn check_sources(sources: &Path) -> CheckResult {
        if sources.is_dir() {
            CheckResult::ok("Sources", format!("Found {}", sources.display()))
        } else {
            CheckResult::error(
                "Sources",
                format!("Folder not found: {}", sources.display()),
            )
        }
    }

    /// At least one category must survive the scan.
    pub fn check_catalog(categories: &[Category]) -> CheckResult {
        if categories.is_empty() {
            return CheckResult::error(
                "Catalog",
                "No categories with products found. Each product folder needs images or videos",
            );
        }
        let products: usize = categories.iter().map(Category::product_count).sum();
        CheckResult::ok(
            "Catalog",
            format!("{} categories, {products} products", categories.len()),
        )
    }

    /// Products without `name.txt` fall back to their cleaned folder name.
    pub fn check_names(categories: &[Category]) -> CheckResult {
        let mut unnamed = Vec::new();
        walk(categories, &mut |category| {
            for product in &category.products {
                if !product.path.join(NAME_FILE).is_file() {
                    unnamed.push(format!("{} (shown as \"{}\")", product.id, product.name));
                }
            }
        });

        if unnamed.is_empty() {
            CheckResult::ok("Names", "Every product has a name.txt")
        } else {
            CheckResult::warning(
                "Names",
                format!("{} products use their folder name", unnamed.len()),
            )
            .with_details(unnamed)
        }
    }

    /// Categories and products without a thumbnail.
    pub fn check_thumbnails(categories: &[Category]) -> CheckResult {
        let mut missing = Vec::new();
        walk(categories, &mut |category| {
            if category.thumbnail.is_none() {
                missing.push(format!("category {}", category.id));
            }
            for product in &category.products {
                if product.thumbnail.is_none() {
                    missing.push(format!("product {}", product.id));
                }
            }
        });

        if missing.is_empty() {
            CheckResult::ok("Thumbnails", "Every category and product has a thumbnail")
        } else {
            CheckResult::warning(
                "Thumbnails",
                format!("{} folders have no thumb.png or thumb.jpg", missing.len()),
            )
            .with_details(missing)
        }
    }

    /// The company folder is optional but expected.
    pub fn check_company(company_dir: &Path) -> CheckResult {
        match load_company_info(company_dir) {
            Some(company) => {
                let logo = if load_company_logo(company_dir).is_some() {
                    "with logo"
                } else {
                    "no logo"
                };
                CheckResult::ok(
                    "Company info",
                    format!("{} ({} media, {logo})", company.name, company.media.len()),
                )
            }
            None => CheckResult::warning(
                "Company info",
                format!(
                    "No company product in {} (needs a Photos folder with media)",
                    company_dir.display()
                ),
            ),
        }
    }

    /// Idle video and timeout override.
    pub fn check_idle(sources: &Path) -> CheckResult {
        let idle_dir = IDLE_ASSETS_PATH
            .iter()
            .fold(sources.to_path_buf(), |dir, part| dir.join(part));

        let time_file = idle_dir.join(IDLE_TIME_FILE);
        if let Ok(content) = fs::read_to_string(&time_file) {
            let valid = content.trim().parse::<u64>().is_ok_and(|secs| secs > 0);
            if !valid {
                return CheckResult::error(
                    "Idle",
                    format!(
                        "{} must hold a positive number of seconds, found \"{}\"",
                        IDLE_TIME_FILE,
                        content.trim()
                    ),
                );
            }
        }

        if idle_dir.join(IDLE_VIDEO_FILE).is_file() {
            CheckResult::ok("Idle", format!("{IDLE_VIDEO_FILE} found"))
        } else {
            CheckResult::warning(
                "Idle",
                format!("No {IDLE_VIDEO_FILE} in {}", idle_dir.display()),
            )
        }
    }

    /// `config.json` must parse when present, and its images must exist.
    pub fn check_branding(branding_dir: &Path) -> CheckResult {
        let config_path = branding_dir.join(BRANDING_CONFIG_FILE);
        let Ok(content) = fs::read_to_string(&config_path) else {
            return CheckResult::ok("Branding", "No config.json, using the default theme");
        };

        let mut branding = match BrandingConfig::parse(&content) {
            Ok(branding) => branding,
            Err(e) => {
                return CheckResult::error("Branding", "config.json is not valid branding JSON")
                    .with_details(vec![e.to_string()]);
            }
        };
        branding.resolve_images(branding_dir);

        let mut missing = Vec::new();
        if let (Some(logo), None) = (&branding.logo, &branding.logo_path) {
            missing.push(format!("logo {logo}"));
        }
        if let Some(background) = &branding.background {
            if background.kind == crate::branding::BackgroundKind::Image
                && branding.background_path.is_none()
            {
                missing.push(format!("background {}", background.value));
            }
        }

        if missing.is_empty() {
            CheckResult::ok("Branding", "config.json loaded")
        } else {
            CheckResult::warning("Branding", "Branding images not found").with_details(missing)
        }
    }

    /// The assistant needs at least one provider key.
    pub fn check_api_keys(app_root: &Path) -> CheckResult {
        let providers = ApiKeys::load(app_root).providers();
        if providers.is_empty() {
            CheckResult::warning(
                "API keys",
                format!("No keys in {API_KEYS_FILE}, the assistant is unavailable"),
            )
        } else {
            let names: Vec<&str> = providers.iter().map(|p| p.env_key()).collect();
            CheckResult::ok("API keys", names.join(", "))
        }
    }
}

fn walk(categories: &[Category], visit: &mut impl FnMut(&Category)) {
    for category in categories {
        visit(category);
        walk(&category.subcategories, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_sources_is_error() {
        let dir = TempDir::new().unwrap();
        let results = ContentChecker::default().check_all(dir.path());
        assert_eq!(results[0].name, "Sources");
        assert_eq!(results[0].level, CheckLevel::Error);
        assert!(results.iter().all(|r| r.name != "Catalog"));
    }

    #[test]
    fn test_empty_sources_has_no_catalog() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Sources/Empty")).unwrap();
        let results = ContentChecker::default().check_all(dir.path());
        let catalog = results.iter().find(|r| r.name == "Catalog").unwrap();
        assert_eq!(catalog.level, CheckLevel::Error);
    }

    #[test]
    fn test_names_and_thumbnails_warn() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Sources/Shoes/01_Runner/a.jpg", "x");
        write(dir.path(), "Sources/Shoes/Loafer/a.jpg", "x");
        write(dir.path(), "Sources/Shoes/Loafer/name.txt", "Loafer");
        write(dir.path(), "Sources/Shoes/Loafer/thumb.png", "x");
        write(dir.path(), "Sources/Shoes/thumb.jpg", "x");

        let results = ContentChecker::default().check_all(dir.path());
        let names = results.iter().find(|r| r.name == "Names").unwrap();
        assert_eq!(names.level, CheckLevel::Warning);
        assert_eq!(names.details, vec!["01_Runner (shown as \"Runner\")"]);

        let thumbs = results.iter().find(|r| r.name == "Thumbnails").unwrap();
        assert_eq!(thumbs.details, vec!["product 01_Runner"]);
    }

    #[test]
    fn test_invalid_idle_time_is_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Sources/ASSETS/Idle/idle_time.txt", "soon");
        let result = ContentChecker::check_idle(&dir.path().join("Sources"));
        assert_eq!(result.level, CheckLevel::Error);

        write(dir.path(), "Sources/ASSETS/Idle/idle_time.txt", "90");
        write(dir.path(), "Sources/ASSETS/Idle/idle.mp4", "x");
        let result = ContentChecker::check_idle(&dir.path().join("Sources"));
        assert_eq!(result.level, CheckLevel::Ok);
    }

    #[test]
    fn test_branding_checks() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ContentChecker::check_branding(dir.path()).level, CheckLevel::Ok);

        write(dir.path(), "config.json", "{ nope");
        assert_eq!(
            ContentChecker::check_branding(dir.path()).level,
            CheckLevel::Error
        );

        write(dir.path(), "config.json", r#"{"logo": "logo.png"}"#);
        let result = ContentChecker::check_branding(dir.path());
        assert_eq!(result.level, CheckLevel::Warning);
        assert_eq!(result.details, vec!["logo logo.png"]);
    }

    #[test]
    fn test_api_keys() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            ContentChecker::check_api_keys(dir.path()).level,
            CheckLevel::Warning
        );
        write(dir.path(), "api-keys.txt", "GEMINI_API_KEY=abc\n");
        let result = ContentChecker::check_api_keys(dir.path());
        assert_eq!(result.level, CheckLevel::Ok);
        assert_eq!(result.message, "GEMINI_API_KEY");
    }
}
