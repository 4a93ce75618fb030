//! Content scanner: turns a `Sources/` folder hierarchy into the catalog tree.
//!
//! Every directory below Sources is exactly one of:
//!
//! - a **product**, when it holds qualifying media under the active
//!   [`ClassificationRule`],
//! - a **category**, when it is not a product and at least one child folder
//!   turned into a product or a non-empty category,
//! - **nothing**, otherwise (pruned from the tree).
//!
//! Top-level folders of Sources are always categories. Skip-listed folder
//! names (`Photos`, `ASSETS`, ...) and hidden entries are ignored at every
//! depth. Children keep the order in which the filesystem lists them.
//!
//! The scanner never fails: a missing Sources folder scans to an empty list
//! and unreadable or malformed optional files are treated as absent.

pub mod docx;
pub mod naming;
pub mod sidecar;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{ClassificationRule, ScanConfig};
use crate::constants::{MEDIA_SUBFOLDER, SKIP_FOLDERS, THUMBNAIL_CANDIDATES};
use crate::models::{Category, MediaFile, MediaKind, Product};

pub use naming::{clean_folder_name, read_display_name};

/// Result of classifying a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNode {
    /// The directory holds qualifying media
    Product(Product),
    /// The directory groups at least one product or non-empty category
    Category(Category),
}

/// Directory walker applying one classification rule and a depth limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner {
    rule: ClassificationRule,
    max_depth: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl Scanner {
    /// Creates a scanner. Top-level folders of Sources are depth 1.
    #[must_use]
    pub const fn new(rule: ClassificationRule, max_depth: usize) -> Self {
        Self { rule, max_depth }
    }

    /// Creates a scanner from the `[scan]` config section.
    #[must_use]
    pub const fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.rule, config.max_depth)
    }

    /// The active classification rule.
    #[must_use]
    pub const fn rule(&self) -> ClassificationRule {
        self.rule
    }

    /// Scans the Sources folder into its list of root categories.
    ///
    /// A missing or unreadable Sources folder yields an empty list.
    pub fn scan_sources(&self, sources: &Path) -> Vec<Category> {
        if !sources.is_dir() {
            warn!(path = %sources.display(), "Sources folder not found, catalog is empty");
            return Vec::new();
        }

        let Some(children) = child_directories(sources) else {
            return Vec::new();
        };

        let categories: Vec<Category> = children
            .into_iter()
            .filter_map(|(path, name)| self.scan_category(&path, &name, 1))
            .collect();

        info!(
            path = %sources.display(),
            rule = self.rule.as_str(),
            categories = categories.len(),
            products = categories.iter().map(Category::product_count).sum::<usize>(),
            "Scanned catalog"
        );

        categories
    }

    /// Classifies one directory as a product, a category, or nothing.
    ///
    /// The directory is treated as sitting directly below Sources for the
    /// purpose of the depth limit.
    pub fn classify(&self, dir: &Path) -> Option<CatalogNode> {
        let name = folder_name(dir);
        self.classify_at(dir, &name, 1)
    }

    /// Scans a directory as a product, ignoring the depth limit.
    ///
    /// Returns `None` when the directory has no qualifying media under the
    /// active rule.
    pub fn scan_product(&self, dir: &Path) -> Option<Product> {
        let name = folder_name(dir);
        self.scan_product_named(dir, &name)
    }

    fn classify_at(&self, dir: &Path, name: &str, depth: usize) -> Option<CatalogNode> {
        if let Some(product) = self.scan_product_named(dir, name) {
            return Some(CatalogNode::Product(product));
        }
        self.scan_category(dir, name, depth).map(CatalogNode::Category)
    }

    fn scan_category(&self, dir: &Path, name: &str, depth: usize) -> Option<Category> {
        let children = child_directories(dir)?;

        let mut subcategories = Vec::new();
        let mut products = Vec::new();

        for (child_path, child_name) in children {
            if depth + 1 > self.max_depth {
                warn!(
                    path = %child_path.display(),
                    max_depth = self.max_depth,
                    "Skipping folder below the scan depth limit"
                );
                continue;
            }

            match self.classify_at(&child_path, &child_name, depth + 1) {
                Some(CatalogNode::Product(product)) => products.push(product),
                Some(CatalogNode::Category(category)) => subcategories.push(category),
                None => debug!(path = %child_path.display(), "Pruned empty folder"),
            }
        }

        if subcategories.is_empty() && products.is_empty() {
            return None;
        }

        Some(Category {
            id: name.to_string(),
            name: read_display_name(dir, name),
            path: dir.to_path_buf(),
            subcategories,
            products,
            thumbnail: sidecar::first_existing(dir, THUMBNAIL_CANDIDATES),
        })
    }

    fn scan_product_named(&self, dir: &Path, name: &str) -> Option<Product> {
        let (media_dir, media_paths) = self.find_media(dir)?;

        let caption_folders: Vec<&Path> = if media_dir == dir {
            vec![dir]
        } else {
            vec![media_dir.as_path(), dir]
        };
        let captions = sidecar::load_captions(&caption_folders);

        let media = media_paths
            .into_iter()
            .enumerate()
            .filter_map(|(index, path)| {
                let kind = MediaKind::from_path(&path)?;
                let filename = path.file_name()?.to_string_lossy().into_owned();
                let entry = captions.get(&filename).cloned().unwrap_or_default();
                Some(MediaFile {
                    id: format!("{name}-{index}"),
                    kind,
                    filename,
                    path,
                    caption: entry.caption,
                    description: entry.description,
                })
            })
            .collect();

        Some(Product {
            id: name.to_string(),
            name: read_display_name(dir, name),
            path: dir.to_path_buf(),
            media,
            description: sidecar::load_description(dir),
            ai_context: sidecar::load_ai_context(dir),
            thumbnail: sidecar::first_existing(dir, THUMBNAIL_CANDIDATES),
        })
    }

    /// Locates the folder holding a product's media and lists it.
    ///
    /// Returns `None` when the active rule finds no qualifying media.
    fn find_media(&self, dir: &Path) -> Option<(PathBuf, Vec<PathBuf>)> {
        let in_subfolder = || {
            let photos = dir.join(MEDIA_SUBFOLDER);
            if !photos.is_dir() {
                return None;
            }
            let media = media_files(&photos, false);
            (!media.is_empty()).then_some((photos, media))
        };
        let direct = || {
            let media = media_files(dir, true);
            (!media.is_empty()).then(|| (dir.to_path_buf(), media))
        };

        match self.rule {
            ClassificationRule::MediaSubfolder => in_subfolder(),
            ClassificationRule::Direct => direct(),
            ClassificationRule::Either => in_subfolder().or_else(direct),
        }
    }
}

/// Scans a Sources folder with the given scan settings.
pub fn scan_sources(sources: &Path, config: &ScanConfig) -> Vec<Category> {
    Scanner::from_config(config).scan_sources(sources)
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || SKIP_FOLDERS.contains(&name)
}

/// Lists child directories in listing order, without skip-listed or hidden ones.
///
/// Returns `None` when the directory itself cannot be read.
fn child_directories(dir: &Path) -> Option<Vec<(PathBuf, String)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Failed to read folder");
            return None;
        }
    };

    let children = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            (!is_ignored(&name) && path.is_dir()).then_some((path, name))
        })
        .collect();

    Some(children)
}

/// Lists qualifying media files directly inside `dir`, in listing order.
///
/// With `skip_thumbnails`, thumbnail candidates are not counted as media.
fn media_files(dir: &Path, skip_thumbnails: bool) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            !name.starts_with('.')
                && !(skip_thumbnails && THUMBNAIL_CANDIDATES.contains(&name.as_str()))
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && MediaKind::from_path(path).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_photos_subfolder_makes_product() {
        let dir = TempDir::new().unwrap();
        let product = dir.path().join("Widget");
        touch(&product.join("Photos").join("1.jpg"));
        touch(&product.join("Photos").join("notes.txt"));

        let scanner = Scanner::new(ClassificationRule::MediaSubfolder, 32);
        let found = scanner.scan_product(&product).unwrap();
        assert_eq!(found.id, "Widget");
        assert_eq!(found.media.len(), 1);
        assert_eq!(found.media[0].id, "Widget-0");
        assert_eq!(found.media[0].filename, "1.jpg");
    }

    #[test]
    fn test_media_subfolder_rule_ignores_direct_media() {
        let dir = TempDir::new().unwrap();
        let product = dir.path().join("Widget");
        touch(&product.join("1.jpg"));

        let scanner = Scanner::new(ClassificationRule::MediaSubfolder, 32);
        assert!(scanner.scan_product(&product).is_none());
        assert!(scanner.classify(&product).is_none());
    }

    #[test]
    fn test_direct_rule_ignores_subfolder() {
        let dir = TempDir::new().unwrap();
        let product = dir.path().join("Widget");
        touch(&product.join("Photos").join("1.jpg"));

        let scanner = Scanner::new(ClassificationRule::Direct, 32);
        assert!(scanner.scan_product(&product).is_none());

        touch(&product.join("2.mp4"));
        let found = scanner.scan_product(&product).unwrap();
        assert_eq!(found.media.len(), 1);
        assert_eq!(found.media[0].kind, MediaKind::Video);
    }

    #[test]
    fn test_either_rule_prefers_subfolder() {
        let dir = TempDir::new().unwrap();
        let product = dir.path().join("Widget");
        touch(&product.join("loose.png"));
        touch(&product.join("Photos").join("gallery.png"));

        let scanner = Scanner::new(ClassificationRule::Either, 32);
        let found = scanner.scan_product(&product).unwrap();
        assert_eq!(found.media.len(), 1);
        assert_eq!(found.media[0].filename, "gallery.png");

        fs::remove_file(product.join("Photos").join("gallery.png")).unwrap();
        let found = scanner.scan_product(&product).unwrap();
        assert_eq!(found.media[0].filename, "loose.png");
    }

    #[test]
    fn test_thumbnail_is_not_direct_media() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("Tools");
        touch(&folder.join("thumb.png"));

        let scanner = Scanner::new(ClassificationRule::Either, 32);
        assert!(scanner.scan_product(&folder).is_none());

        touch(&folder.join("drill.jpg"));
        let found = scanner.scan_product(&folder).unwrap();
        assert_eq!(found.media.len(), 1);
        assert_eq!(found.thumbnail, Some(folder.join("thumb.png")));
    }

    #[test]
    fn test_hidden_files_are_not_media() {
        let dir = TempDir::new().unwrap();
        let product = dir.path().join("Widget");
        touch(&product.join("Photos").join("._1.jpg"));

        let scanner = Scanner::default();
        assert!(scanner.scan_product(&product).is_none());
    }

    #[test]
    fn test_classify_category_and_nothing() {
        let dir = TempDir::new().unwrap();
        let shoes = dir.path().join("Shoes");
        touch(&shoes.join("Runner").join("Photos").join("a.webp"));
        fs::create_dir_all(shoes.join("Empty")).unwrap();

        let scanner = Scanner::default();
        match scanner.classify(&shoes) {
            Some(CatalogNode::Category(category)) => {
                assert_eq!(category.products.len(), 1);
                assert!(category.subcategories.is_empty());
            }
            other => panic!("expected a category, got {other:?}"),
        }

        assert!(scanner.classify(&shoes.join("Empty")).is_none());
    }

    #[test]
    fn test_depth_limit_prunes_deep_folders() {
        let dir = TempDir::new().unwrap();
        let sources = dir.path().join("Sources");
        touch(&sources.join("A").join("B").join("C").join("Photos").join("x.jpg"));

        let shallow = Scanner::new(ClassificationRule::Either, 2);
        assert!(shallow.scan_sources(&sources).is_empty());

        let deep = Scanner::new(ClassificationRule::Either, 3);
        let categories = deep.scan_sources(&sources);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].subcategories[0].products[0].id, "C");
    }

    #[test]
    fn test_missing_sources_is_empty() {
        let dir = TempDir::new().unwrap();
        let scanner = Scanner::default();
        assert!(scanner.scan_sources(&dir.path().join("Nope")).is_empty());
    }
}
