//! Optional per-folder metadata files.
//!
//! Every loader here treats a missing or unreadable file as absence. Nothing
//! in this module returns an error to the scanner.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{AI_CONTEXT_FILE, CAPTIONS_FILE, DESCRIPTION_DOCX_FILE};

use super::docx;

/// Caption and description for one media file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionEntry {
    /// Short caption
    pub caption: Option<String>,
    /// Longer description
    pub description: Option<String>,
}

/// Captions keyed by media filename.
pub type Captions = HashMap<String, CaptionEntry>;

/// Parses `filename|caption|description` lines.
///
/// Blank lines and lines without at least one `|` are skipped. Empty caption
/// or description fields become `None`. Later lines win for duplicate
/// filenames.
#[must_use]
pub fn parse_captions(content: &str) -> Captions {
    let mut captions = Captions::new();

    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 2 {
            debug!(line, "Skipping caption line without a caption field");
            continue;
        }

        let non_empty = |value: Option<&&str>| {
            value
                .filter(|value| !value.is_empty())
                .map(|value| (*value).to_string())
        };

        captions.insert(
            parts[0].to_string(),
            CaptionEntry {
                caption: non_empty(parts.get(1)),
                description: non_empty(parts.get(2)),
            },
        );
    }

    captions
}

/// Loads the first `captions.txt` found in `folders`, in order.
///
/// A product looks in its media subfolder before its own folder.
#[must_use]
pub fn load_captions(folders: &[&Path]) -> Captions {
    for folder in folders {
        let path = folder.join(CAPTIONS_FILE);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(content) => return parse_captions(&content),
            Err(e) => debug!(path = %path.display(), error = %e, "Unreadable captions file"),
        }
    }
    Captions::new()
}

/// Reads `ai.txt`, trimmed. Blank content is absence.
#[must_use]
pub fn load_ai_context(folder: &Path) -> Option<String> {
    read_trimmed(&folder.join(AI_CONTEXT_FILE))
}

/// Extracts the plain text of `product.docx`. Blank text is absence.
#[must_use]
pub fn load_description(folder: &Path) -> Option<String> {
    let path = folder.join(DESCRIPTION_DOCX_FILE);
    if !path.is_file() {
        return None;
    }

    match docx::extract_text(&path) {
        Ok(text) if !text.is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not read product description");
            None
        }
    }
}

/// Returns the first of `candidates` that exists as a file in `folder`.
#[must_use]
pub fn first_existing(folder: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| folder.join(name))
        .find(|path| path.is_file())
}

/// Reads a text file and trims it. Missing, unreadable or blank is `None`.
pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
