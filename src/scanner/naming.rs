//! Display names for catalog folders.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::constants::NAME_FILE;

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_+").expect("order prefix pattern is valid"));

static STATUS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[_-](done|todo|wip|draft|old|new|backup)$")
        .expect("status suffix pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Turns a working folder name into a display name.
///
/// Strips a leading ordering prefix (`001_`), a trailing status marker
/// (`_done`, `-WIP`, ...), turns `_` and `-` into spaces and collapses runs
/// of whitespace. The status marker must follow a separator, so the result
/// of cleaning never changes when cleaned again.
///
/// A name that cleans down to nothing falls back to the trimmed folder name.
///
/// # Examples
///
/// ```
/// use vitrine::scanner::clean_folder_name;
///
/// assert_eq!(clean_folder_name("001_Widget_done"), "Widget");
/// assert_eq!(clean_folder_name("02__Hand-Tools_WIP"), "Hand Tools");
/// assert_eq!(clean_folder_name("Widget"), "Widget");
/// ```
#[must_use]
pub fn clean_folder_name(folder_name: &str) -> String {
    let without_prefix = ORDER_PREFIX.replace(folder_name, "");
    let without_suffix = STATUS_SUFFIX.replace(&without_prefix, "");
    let spaced = without_suffix.replace(['_', '-'], " ");
    let cleaned = WHITESPACE.replace_all(spaced.trim(), " ").into_owned();

    if cleaned.is_empty() {
        folder_name.trim().to_string()
    } else {
        cleaned
    }
}

/// Reads `name.txt` in `folder`, falling back to the cleaned folder name.
///
/// Only the first non-blank line counts. A missing, unreadable or blank file
/// is the same as no file.
#[must_use]
pub fn read_display_name(folder: &Path, folder_name: &str) -> String {
    fs::read_to_string(folder.join(NAME_FILE))
        .ok()
        .and_then(|content| {
            content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| clean_folder_name(folder_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strips_prefix_and_suffix() {
        assert_eq!(clean_folder_name("001_Widget_done"), "Widget");
        assert_eq!(clean_folder_name("7_Gadget_TODO"), "Gadget");
        assert_eq!(clean_folder_name("12___Bolt_backup"), "Bolt");
        assert_eq!(clean_folder_name("Lamp-draft"), "Lamp");
    }

    #[test]
    fn test_separators_become_spaces() {
        assert_eq!(clean_folder_name("Running_Shoes"), "Running Shoes");
        assert_eq!(clean_folder_name("hand-tools"), "hand tools");
        assert_eq!(clean_folder_name("  Big   __  Box  "), "Big Box");
    }

    #[test]
    fn test_suffix_needs_separator() {
        assert_eq!(clean_folder_name("Renew"), "Renew");
        assert_eq!(clean_folder_name("Abandoned"), "Abandoned");
    }

    #[test]
    fn test_only_one_suffix_is_removed() {
        assert_eq!(clean_folder_name("Widget_new_old"), "Widget new");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "001_Widget_done",
            "Widget_new_old",
            "02__Hand-Tools_WIP",
            "Plain Name",
            "3_x",
            "_done",
            "2024_Catalog",
        ] {
            let once = clean_folder_name(raw);
            assert_eq!(clean_folder_name(&once), once, "cleaning {raw:?} twice changed it");
        }
    }

    #[test]
    fn test_empty_result_falls_back_to_folder_name() {
        assert_eq!(clean_folder_name("_done"), "_done");
        assert_eq!(clean_folder_name("001_"), "001_");
    }

    #[test]
    fn test_read_display_name_prefers_name_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(NAME_FILE), "\n  Deluxe Widget  \nignored\n").unwrap();
        assert_eq!(read_display_name(dir.path(), "001_Widget_done"), "Deluxe Widget");
    }

    #[test]
    fn test_read_display_name_blank_file_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(NAME_FILE), "   \n\n").unwrap();
        assert_eq!(read_display_name(dir.path(), "001_Widget_done"), "Widget");
    }

    #[test]
    fn test_read_display_name_missing_file_falls_back() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_display_name(dir.path(), "Hand_Tools"), "Hand Tools");
    }
}
