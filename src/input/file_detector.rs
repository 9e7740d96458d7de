//! File type detection

use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" | "text" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    /// Detect from an uploaded file name; names without an extension are unknown.
    pub fn from_filename(filename: &str) -> Self {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(FileType::from_filename("cv.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_filename("notes/resume.md"), FileType::Markdown);
        assert_eq!(FileType::from_filename("resume.txt"), FileType::Text);
        assert_eq!(FileType::from_filename("resume"), FileType::Unknown);
        assert_eq!(FileType::from_filename("resume.docx"), FileType::Unknown);
    }
}
