//! Products: the leaves of the catalog tree.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{MediaFile, MediaKind};

/// A product folder with its ordered media gallery and sidecar metadata.
///
/// A product never has children; it owns its media list exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Folder name
    pub id: String,
    /// From name.txt, or the cleaned folder name
    pub name: String,
    /// Absolute folder path
    pub path: PathBuf,
    /// Gallery items in directory listing order (never empty for scanned products)
    pub media: Vec<MediaFile>,
    /// Plain text extracted from product.docx
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Contents of ai.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_context: Option<String>,
    /// First existing thumbnail candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
}

impl Product {
    /// Number of media items of the given kind.
    #[must_use]
    pub fn count_of(&self, kind: MediaKind) -> usize {
        self.media.iter().filter(|m| m.kind == kind).count()
    }

    /// Number of images in the gallery.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.count_of(MediaKind::Image)
    }

    /// Number of videos in the gallery.
    #[must_use]
    pub fn video_count(&self) -> usize {
        self.count_of(MediaKind::Video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(id: &str, kind: MediaKind) -> MediaFile {
        MediaFile {
            id: id.to_string(),
            kind,
            filename: format!("{id}.bin"),
            path: PathBuf::from(format!("/tmp/{id}.bin")),
            caption: None,
            description: None,
        }
    }

    #[test]
    fn test_media_counts() {
        let product = Product {
            id: "widget".to_string(),
            name: "Widget".to_string(),
            path: PathBuf::from("/tmp/widget"),
            media: vec![
                media("a", MediaKind::Image),
                media("b", MediaKind::Video),
                media("c", MediaKind::Image),
            ],
            description: None,
            ai_context: None,
            thumbnail: None,
        };

        assert_eq!(product.image_count(), 2);
        assert_eq!(product.video_count(), 1);
    }

    #[test]
    fn test_serializes_camel_case_and_skips_empty() {
        let product = Product {
            id: "widget".to_string(),
            name: "Widget".to_string(),
            path: PathBuf::from("/tmp/widget"),
            media: vec![],
            description: None,
            ai_context: Some("Facts".to_string()),
            thumbnail: None,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["aiContext"], "Facts");
        assert!(json.get("description").is_none());
        assert!(json.get("thumbnail").is_none());
    }
}
