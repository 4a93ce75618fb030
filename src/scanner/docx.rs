//! Plain-text extraction from Word documents.
//!
//! A `.docx` is a zip archive; the body lives in `word/document.xml`. Paragraph
//! and line breaks are kept as newlines, every other tag is dropped.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

const DOCUMENT_ENTRY: &str = "word/document.xml";

static BREAK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").expect("break tag pattern is valid")
});

static TAB_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:tab\s*/>").expect("tab tag pattern is valid"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|lt|gt|quot|apos|amp);")
        .expect("entity pattern is valid")
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

/// Extracts the trimmed plain text of a `.docx` file.
pub fn extract_text(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    extract_text_from(file).with_context(|| format!("Failed to read {}", path.display()))
}

/// Extracts the trimmed plain text of a `.docx` archive from any seekable reader.
pub fn extract_text_from<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(reader).context("Not a zip archive")?;
    let mut entry = archive
        .by_name(DOCUMENT_ENTRY)
        .with_context(|| format!("Archive has no {DOCUMENT_ENTRY}"))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .with_context(|| format!("Failed to read {DOCUMENT_ENTRY}"))?;

    Ok(xml_to_text(&xml))
}

/// Converts WordprocessingML to plain text.
fn xml_to_text(xml: &str) -> String {
    let with_breaks = BREAK_TAGS.replace_all(xml, "\n");
    let with_tabs = TAB_TAGS.replace_all(&with_breaks, "\t");
    let stripped = ANY_TAG.replace_all(&with_tabs, "");
    let unescaped = unescape_xml(&stripped);

    let lines: Vec<&str> = unescaped.lines().map(str::trim_end).collect();
    BLANK_RUNS
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Decodes the five named entities and numeric character references in one
/// pass. References to invalid code points are left as written.
fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let hex = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"));
                    let code = match hex {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(DOCUMENT_ENTRY, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body>
            <w:p><w:r><w:t>Stainless steel</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Weight: </w:t></w:r><w:r><w:t>2 kg</w:t></w:r></w:p>
            </w:body></w:document>"#;

        let text = extract_text_from(Cursor::new(docx_bytes(xml))).unwrap();
        assert_eq!(text, "Stainless steel\nWeight: 2 kg");
    }

    #[test]
    fn test_entities_and_tabs() {
        let xml = "<w:p><w:r><w:t>A &amp; B</w:t><w:tab/><w:t>&lt;new&gt;</w:t></w:r></w:p>";
        let text = extract_text_from(Cursor::new(docx_bytes(xml))).unwrap();
        assert_eq!(text, "A & B\t<new>");
    }

    #[test]
    fn test_numeric_character_references() {
        let xml = "<w:p><w:r><w:t>it&#8217;s &#x41;&#X42; &#169;</w:t></w:r></w:p>";
        let text = extract_text_from(Cursor::new(docx_bytes(xml))).unwrap();
        assert_eq!(text, "it\u{2019}s AB \u{a9}");
    }

    #[test]
    fn test_entities_are_decoded_once() {
        assert_eq!(unescape_xml("&amp;#65; &amp;lt;"), "&#65; &lt;");
        assert_eq!(unescape_xml("bad &#xD800; &#99999999999;"), "bad &#xD800; &#99999999999;");
    }

    #[test]
    fn test_missing_document_entry_is_error() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("other.xml", SimpleFileOptions::default())
                .unwrap();
            writer.finish().unwrap();
        }
        assert!(extract_text_from(Cursor::new(buffer.into_inner())).is_err());
    }

    #[test]
    fn test_not_a_zip_is_error() {
        assert!(extract_text_from(Cursor::new(b"plain text".to_vec())).is_err());
    }
}
