//! Readable content sources for document ingestion.
//!
//! Ingestion is decoupled from where a document's text comes from: an
//! in-memory upload body and a plain-text file on disk both yield the same
//! `String`. Binary format decoding (PDF and friends) happens upstream and
//! hands plain text to this layer.

use std::path::PathBuf;

use crate::Result;

/// Source of a document's plain-text content
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// Content supplied directly in the request body
    Inline(String),
    /// Path to a UTF-8 text file on disk
    FilePath(PathBuf),
}

impl ContentSource {
    /// Produce the plain text of this source
    pub fn read_text(&self) -> Result<String> {
        match self {
            ContentSource::Inline(text) => Ok(text.clone()),
            ContentSource::FilePath(path) => Ok(std::fs::read_to_string(path)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_inline_source() {
        let source = ContentSource::Inline("hello".to_string());
        assert_eq!(source.read_text().unwrap(), "hello");
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "file content here").unwrap();

        let source = ContentSource::FilePath(file.path().to_path_buf());
        assert_eq!(source.read_text().unwrap(), "file content here");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = ContentSource::FilePath(PathBuf::from("/nonexistent/docrag-test.txt"));
        assert!(source.read_text().is_err());
    }
}
