//! Text extraction from raw resume bytes
//!
//! Extraction never fails: a decoder error degrades to a best-effort
//! string built from the bytes themselves.

use crate::error::{Result, SkillMatchError};
use crate::input::file_detector::FileType;
use log::{debug, warn};
use pulldown_cmark::{html, Parser};
use regex::Regex;

/// Share of U+FFFD replacements tolerated before bytes are escaped instead
const MAX_REPLACEMENT_RATIO: f32 = 0.1;

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed documents
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| SkillMatchError::PdfExtraction("PDF parser panicked".to_string()))?
            .map_err(|e| {
                SkillMatchError::PdfExtraction(format!("Failed to extract text from PDF: {}", e))
            })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SkillMatchError::InvalidInput(format!("Resume is not valid UTF-8: {}", e)))
    }
}

pub struct MarkdownExtractor {
    tag_regex: Regex,
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self {
            tag_regex: Regex::new(r"<[^>]*>").expect("Invalid tag regex"),
        }
    }

    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");

        // entities are decoded after tag stripping so escaped angle brackets survive
        let clean_text = self
            .tag_regex
            .replace_all(&text, "")
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(bytes)?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

/// Turn uploaded resume bytes into text, choosing a decoder from `filename`.
pub fn extract_text(bytes: &[u8], filename: &str) -> String {
    let file_type = FileType::from_filename(filename);
    debug!("Extracting {} bytes from '{}' as {:?}", bytes.len(), filename, file_type);

    let extracted = match file_type {
        FileType::Pdf => PdfExtractor.extract(bytes),
        FileType::Markdown => MarkdownExtractor::new().extract(bytes),
        FileType::Text | FileType::Unknown => PlainTextExtractor.extract(bytes),
    };

    match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!("Falling back to raw bytes for '{}': {}", filename, e);
            stringify_bytes(bytes)
        }
    }
}

/// Best-effort text for bytes no decoder accepted.
pub fn stringify_bytes(bytes: &[u8]) -> String {
    let lossy = String::from_utf8_lossy(bytes);
    let total = lossy.chars().count();
    let replaced = lossy.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();

    if total > 0 && (replaced as f32 / total as f32) <= MAX_REPLACEMENT_RATIO {
        return lossy.into_owned();
    }

    let escaped: String = bytes
        .iter()
        .flat_map(|&b| std::ascii::escape_default(b))
        .map(char::from)
        .collect();
    format!("b'{}'", escaped)
}
