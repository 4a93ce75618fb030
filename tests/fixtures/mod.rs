//! Shared content-root fixtures for integration tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use vitrine::config::Config;
use vitrine::services::{Catalog, CatalogService};

/// A content root in a temporary directory.
pub struct ContentRoot {
    dir: TempDir,
}

impl ContentRoot {
    /// An empty content root with an empty `Sources/` folder.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("Sources")).expect("Failed to create Sources");
        Self { dir }
    }

    /// The content root itself.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/Sources`
    pub fn sources(&self) -> PathBuf {
        self.path().join("Sources")
    }

    /// Writes `contents` to `relative` below the content root, creating parents.
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Creates an empty directory below the content root.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path().join(relative);
        fs::create_dir_all(&path).expect("Failed to create fixture dir");
        path
    }

    /// Adds a media file below `Sources/`.
    pub fn media(&self, relative: &str) -> PathBuf {
        self.write(&format!("Sources/{relative}"), b"media")
    }

    /// A config pointing at this content root.
    pub fn config(&self) -> Config {
        Config::with_app_root(self.path())
    }

    /// Scans this content root with the default settings.
    pub fn scan(&self) -> Arc<Catalog> {
        CatalogService::load(&self.config()).catalog()
    }
}

/// The store layout most tests use:
///
/// ```text
/// Sources/
///   01_Shoes/
///     Runner_done/Photos/1.jpg, 2.mp4, name.txt = "Road Runner"
///     Trail/
///       Hiker/a.png
///   02_Bags/
///     Tote/b.jpg
///   EmptyFolder/
/// CompanyInfo/Photos/office.jpg
/// ```
pub fn store() -> ContentRoot {
    let root = ContentRoot::new();
    root.media("01_Shoes/Runner_done/Photos/1.jpg");
    root.media("01_Shoes/Runner_done/Photos/2.mp4");
    root.write("Sources/01_Shoes/Runner_done/name.txt", b"Road Runner\n");
    root.media("01_Shoes/Trail/Hiker/a.png");
    root.media("02_Bags/Tote/b.jpg");
    root.mkdir("Sources/EmptyFolder");
    root.write("CompanyInfo/Photos/office.jpg", b"media");
    root
}
