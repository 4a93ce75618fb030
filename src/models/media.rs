//! Media files shown in a product gallery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Kind of a gallery item, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image rendered in the carousel
    Image,
    /// Video played inline or fullscreen
    Video,
}

impl MediaKind {
    /// Classifies a path by its extension (case-insensitive).
    ///
    /// Returns `None` for anything that is not a recognized image or video.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine::models::MediaKind;
    /// use std::path::Path;
    ///
    /// assert_eq!(MediaKind::from_path(Path::new("a.JPG")), Some(MediaKind::Image));
    /// assert_eq!(MediaKind::from_path(Path::new("clip.mov")), Some(MediaKind::Video));
    /// assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// A single image or video of a product.
///
/// Immutable once scanned. The order of a product's media follows the
/// directory listing it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    /// `<product folder>-<index>`
    pub id: String,
    /// Image or video
    pub kind: MediaKind,
    /// Filename only (e.g., "front.jpg")
    pub filename: String,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Short caption from captions.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Longer description from captions.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MediaFile {
    /// Returns true for videos.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
