//! Catalog service: everything the kiosk reads from the content root.
//!
//! The content root (`app_root`) holds:
//!
//! ```text
//! app_root/
//! ├── Sources/                 catalog tree
//! │   └── ASSETS/Idle/         idle.mp4, idle_time.txt
//! ├── CompanyInfo/             company product (Photos/, name.txt, logo.*)
//! ├── Branding/config.json     theme
//! └── api-keys.txt             assistant provider keys
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::branding::BrandingConfig;
use crate::config::{ClassificationRule, Config};
use crate::constants::{IDLE_ASSETS_PATH, IDLE_TIME_FILE, IDLE_VIDEO_FILE, LOGO_CANDIDATES};
use crate::models::{self, Category, Product};
use crate::scanner::{sidecar, Scanner};

/// Idle takeover settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleConfig {
    /// Ambient video, when `idle.mp4` exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
    /// Seconds of inactivity before the takeover
    pub timeout_secs: u64,
}

/// One complete scan of the content root.
///
/// A catalog is never modified after it is built; a rescan produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Root categories of Sources
    pub categories: Vec<Category>,
    /// Company product shown after the idle takeover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Product>,
    /// Company logo file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<PathBuf>,
    /// Idle takeover settings
    pub idle: IdleConfig,
    /// Theme
    pub branding: BrandingConfig,
    /// When the scan finished
    pub scanned_at: DateTime<Utc>,
}

impl Catalog {
    /// An empty catalog with default idle timeout and branding.
    #[must_use]
    pub fn empty(idle_timeout_secs: u64) -> Self {
        Self {
            categories: Vec::new(),
            company: None,
            company_logo: None,
            idle: IdleConfig {
                video_path: None,
                timeout_secs: idle_timeout_secs,
            },
            branding: BrandingConfig::default(),
            scanned_at: Utc::now(),
        }
    }

    /// Depth-first category lookup by id.
    #[must_use]
    pub fn find_category(&self, id: &str) -> Option<&Category> {
        models::find_category(&self.categories, id)
    }

    /// Depth-first product lookup by id. The company product is found too.
    #[must_use]
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        models::find_product(&self.categories, id)
            .or_else(|| self.company.as_ref().filter(|company| company.id == id))
    }

    /// Resolves a category id as seen from the open category.
    ///
    /// Folder names repeat across branches, so the children of `current`
    /// win, then `current` itself, then the roots. Only then is the whole
    /// tree searched.
    #[must_use]
    pub fn resolve_category<'a>(&'a self, current: Option<&'a Category>, id: &str) -> Option<&'a Category> {
        if let Some(current) = current {
            if let Some(child) = current.child_category(id) {
                return Some(child);
            }
            if current.id == id {
                return Some(current);
            }
        }
        self.categories
            .iter()
            .find(|root| root.id == id)
            .or_else(|| self.find_category(id))
    }

    /// Resolves a product id as seen from the open category.
    ///
    /// Products of `current` win over the company product, which wins over
    /// the rest of the tree.
    #[must_use]
    pub fn resolve_product<'a>(&'a self, current: Option<&'a Category>, id: &str) -> Option<&'a Product> {
        current
            .and_then(|category| category.child_product(id))
            .or_else(|| self.company.as_ref().filter(|company| company.id == id))
            .or_else(|| models::find_product(&self.categories, id))
    }

    /// Total number of products in the tree, not counting the company product.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.categories.iter().map(Category::product_count).sum()
    }
}

/// A file below the content root, ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Canonical absolute path
    pub path: PathBuf,
    /// MIME type guessed from the extension
    pub mime: String,
}

/// Loads and rescans the content root.
#[derive(Debug, Clone)]
pub struct CatalogService {
    app_root: PathBuf,
    scanner: Scanner,
    default_idle_secs: u64,
    catalog: Arc<Catalog>,
}

impl CatalogService {
    /// Scans the content root named by the configuration.
    #[must_use]
    pub fn load(config: &Config) -> Self {
        Self::new(
            config.paths.app_root.clone(),
            Scanner::from_config(&config.scan),
            config.timers.idle_timeout_secs,
        )
    }

    /// Scans `app_root` with the given scanner.
    #[must_use]
    pub fn new(app_root: PathBuf, scanner: Scanner, default_idle_secs: u64) -> Self {
        let catalog = Arc::new(build_catalog(&app_root, scanner, default_idle_secs));
        Self {
            app_root,
            scanner,
            default_idle_secs,
            catalog,
        }
    }

    /// Content root.
    #[must_use]
    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    /// The current catalog.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Rescans the content root and replaces the catalog as a whole.
    pub fn rescan(&mut self) -> Arc<Catalog> {
        self.catalog = Arc::new(build_catalog(
            &self.app_root,
            self.scanner,
            self.default_idle_secs,
        ));
        self.catalog()
    }

    /// Depth-first category lookup by id.
    #[must_use]
    pub fn find_category(&self, id: &str) -> Option<&Category> {
        self.catalog.find_category(id)
    }

    /// Depth-first product lookup by id.
    #[must_use]
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        self.catalog.find_product(id)
    }

    /// Resolves a requested media path to a servable file.
    ///
    /// `requested` is either relative to the content root or an absolute path
    /// as reported in the catalog. Only files inside Sources, CompanyInfo or
    /// Branding are served; anything else (including `..` escapes and
    /// `api-keys.txt`) resolves to `None`.
    #[must_use]
    pub fn resolve_media(&self, requested: &str) -> Option<ResolvedMedia> {
        let requested = requested.trim();
        if requested.is_empty() || requested.contains('\0') {
            return None;
        }

        let config = Config::with_app_root(&self.app_root);
        let served_dirs = [
            config.paths.sources_dir(),
            config.paths.company_info_dir(),
            config.paths.branding_dir(),
        ];

        let path = self.app_root.join(requested).canonicalize().ok()?;
        let served = served_dirs
            .iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .any(|dir| path.starts_with(dir));
        if !served || !path.is_file() {
            return None;
        }

        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Some(ResolvedMedia { path, mime })
    }
}

/// Runs a full scan of the content root.
fn build_catalog(app_root: &Path, scanner: Scanner, default_idle_secs: u64) -> Catalog {
    let config = Config::with_app_root(app_root);
    let sources = config.paths.sources_dir();
    let company_dir = config.paths.company_info_dir();

    let categories = scanner.scan_sources(&sources);
    let company = load_company_info(&company_dir);
    let company_logo = load_company_logo(&company_dir);
    let idle = load_idle_config(&sources, default_idle_secs);
    let branding = BrandingConfig::load(&config.paths.branding_dir());

    Catalog {
        categories,
        company,
        company_logo,
        idle,
        branding,
        scanned_at: Utc::now(),
    }
}

/// Scans the company folder as a product.
///
/// The company folder always keeps its gallery in `Photos/`, so the logo
/// files next to it are never mistaken for media.
#[must_use]
pub fn load_company_info(company_dir: &Path) -> Option<Product> {
    let company = Scanner::new(ClassificationRule::MediaSubfolder, 1).scan_product(company_dir);
    match &company {
        Some(product) => info!(
            name = %product.name,
            media = product.media.len(),
            "Company info loaded"
        ),
        None => info!(path = %company_dir.display(), "No company info found"),
    }
    company
}

/// First `logo.png|logo.jpg|logo.jpeg` in the company folder.
#[must_use]
pub fn load_company_logo(company_dir: &Path) -> Option<PathBuf> {
    sidecar::first_existing(company_dir, LOGO_CANDIDATES)
}

/// Reads idle settings from `Sources/ASSETS/Idle`.
///
/// `idle_time.txt` overrides `default_secs` when it holds a positive integer.
#[must_use]
pub fn load_idle_config(sources: &Path, default_secs: u64) -> IdleConfig {
    let idle_dir = IDLE_ASSETS_PATH
        .iter()
        .fold(sources.to_path_buf(), |dir, part| dir.join(part));

    let video = idle_dir.join(IDLE_VIDEO_FILE);
    let video_path = video.is_file().then_some(video);
    if let Some(video) = &video_path {
        info!(path = %video.display(), "Idle video found");
    }

    let timeout_secs = sidecar::read_trimmed(&idle_dir.join(IDLE_TIME_FILE))
        .and_then(|text| text.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or_else(|| {
            debug!(default_secs, "Using configured idle timeout");
            default_secs
        });

    IdleConfig {
        video_path,
        timeout_secs,
    }
}

/// Joins `requested` onto `base` and returns the canonical path if it is an
/// existing file inside `base`.
#[must_use]
pub fn resolve_within(base: &Path, requested: &Path) -> Option<PathBuf> {
    let base = base.canonicalize().ok()?;
    let candidate = base.join(requested).canonicalize().ok()?;
    (candidate.starts_with(&base) && candidate.is_file()).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COMPANY_INFO_DIR;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"data").unwrap();
    }

    fn content_root() -> TempDir {
        let root = TempDir::new().unwrap();
        let sources = root.path().join("Sources");
        touch(&sources.join("Shoes").join("Runner").join("Photos").join("1.jpg"));
        touch(&sources.join("ASSETS").join("Idle").join("idle.mp4"));
        touch(&root.path().join(COMPANY_INFO_DIR).join("Photos").join("team.jpg"));
        touch(&root.path().join(COMPANY_INFO_DIR).join("logo.jpg"));
        fs::write(root.path().join("api-keys.txt"), "GEMINI_API_KEY=secret").unwrap();
        root
    }

    #[test]
    fn test_load_full_catalog() {
        let root = content_root();
        let service = CatalogService::load(&Config::with_app_root(root.path()));
        let catalog = service.catalog();

        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.product_count(), 1);
        assert_eq!(catalog.company.as_ref().map(|c| c.id.as_str()), Some(COMPANY_INFO_DIR));
        assert_eq!(catalog.company.as_ref().map(|c| c.media.len()), Some(1));
        assert!(catalog.company_logo.as_ref().unwrap().ends_with("logo.jpg"));
        assert!(catalog.idle.video_path.is_some());
        assert_eq!(catalog.idle.timeout_secs, 60);
    }

    #[test]
    fn test_find_product_includes_company() {
        let root = content_root();
        let service = CatalogService::load(&Config::with_app_root(root.path()));
        assert!(service.find_product("Runner").is_some());
        assert!(service.find_product(COMPANY_INFO_DIR).is_some());
        assert!(service.find_category("Shoes").is_some());
        assert!(service.find_category("Runner").is_none());
    }

    #[test]
    fn test_idle_time_override() {
        let root = TempDir::new().unwrap();
        let idle_dir = root.path().join("ASSETS").join("Idle");
        fs::create_dir_all(&idle_dir).unwrap();

        fs::write(idle_dir.join(IDLE_TIME_FILE), " 90 \n").unwrap();
        assert_eq!(load_idle_config(root.path(), 60).timeout_secs, 90);

        fs::write(idle_dir.join(IDLE_TIME_FILE), "0").unwrap();
        assert_eq!(load_idle_config(root.path(), 60).timeout_secs, 60);

        fs::write(idle_dir.join(IDLE_TIME_FILE), "soon").unwrap();
        assert_eq!(load_idle_config(root.path(), 45).timeout_secs, 45);
        assert_eq!(load_idle_config(root.path(), 45).video_path, None);
    }

    #[test]
    fn test_rescan_replaces_tree() {
        let root = content_root();
        let mut service = CatalogService::load(&Config::with_app_root(root.path()));
        assert_eq!(service.catalog().product_count(), 1);

        touch(
            &root
                .path()
                .join("Sources")
                .join("Bags")
                .join("Tote")
                .join("Photos")
                .join("a.png"),
        );
        let before = service.catalog();
        let after = service.rescan();

        assert_eq!(before.product_count(), 1);
        assert_eq!(after.product_count(), 2);
        assert!(after.scanned_at >= before.scanned_at);
    }

    #[test]
    fn test_resolve_media() {
        let root = content_root();
        let service = CatalogService::load(&Config::with_app_root(root.path()));

        let media = service
            .resolve_media("Sources/Shoes/Runner/Photos/1.jpg")
            .unwrap();
        assert_eq!(media.mime, "image/jpeg");

        let absolute = media.path.to_string_lossy().into_owned();
        assert_eq!(service.resolve_media(&absolute), Some(media));

        let video = service.resolve_media("Sources/ASSETS/Idle/idle.mp4").unwrap();
        assert_eq!(video.mime, "video/mp4");
    }

    #[test]
    fn test_resolve_media_rejects_outside_content() {
        let root = content_root();
        let service = CatalogService::load(&Config::with_app_root(root.path()));

        assert_eq!(service.resolve_media("api-keys.txt"), None);
        assert_eq!(service.resolve_media("Sources/../api-keys.txt"), None);
        assert_eq!(service.resolve_media("../../etc/passwd"), None);
        assert_eq!(service.resolve_media("Sources/Shoes"), None);
        assert_eq!(service.resolve_media("Sources/missing.jpg"), None);
        assert_eq!(service.resolve_media(""), None);
    }

    #[test]
    fn test_missing_root_is_empty_catalog() {
        let root = TempDir::new().unwrap();
        let service = CatalogService::load(&Config::with_app_root(root.path().join("nope")));
        let catalog = service.catalog();
        assert!(catalog.categories.is_empty());
        assert!(catalog.company.is_none());
        assert_eq!(catalog.branding, BrandingConfig::default());
    }
}
