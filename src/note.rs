//! A literature note on disk.

use crate::error::{Error, Result};
use crate::frontmatter::HEADER_DELIMITER;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Heading that marks the embedded-PDF section
pub const PAPER_HEADING: &str = "# Paper";

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub path: PathBuf,
    /// File name without extension; doubles as the citekey to match
    pub title: String,
}

impl Note {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::io(
                    &path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "note has no file name"),
                )
            })?;
        Ok(Self { path, title })
    }

    /// Note stored as `<dir>/<file_name>`
    pub fn in_dir(dir: &Path, file_name: &str) -> Result<Self> {
        Self::new(dir.join(file_name))
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))
    }

    /// True when the first line opens a header block
    pub fn has_header(&self) -> Result<bool> {
        let file = fs::File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let mut first_line = String::new();
        BufReader::new(file)
            .read_line(&mut first_line)
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(first_line.starts_with(HEADER_DELIMITER))
    }

    pub fn has_paper_section(&self) -> Result<bool> {
        Ok(contains_paper_heading(&self.read()?))
    }

    /// Write `header` in front of the current content in one atomic replace
    pub fn prepend(&self, header: &str) -> Result<()> {
        let content = self.read()?;
        let mut updated = String::with_capacity(header.len() + content.len());
        updated.push_str(header);
        updated.push_str(&content);
        crate::atomic_write_file(&self.path, updated.as_bytes())
    }

    /// Append `text` after the current content in one atomic replace
    pub fn append(&self, text: &str) -> Result<()> {
        let mut content = self.read()?;
        content.push_str(text);
        crate::atomic_write_file(&self.path, content.as_bytes())
    }

    /// File name the note's PDF is stored under
    pub fn pdf_file_name(&self) -> String {
        format!("{}.pdf", self.title)
    }

    /// Body section linking the note's PDF
    pub fn paper_section(&self) -> String {
        format!("\n{}\n\n![PDF](pdfs/{})\n", PAPER_HEADING, self.pdf_file_name())
    }
}

pub fn contains_paper_heading(content: &str) -> bool {
    content.lines().any(|line| line.trim_end() == PAPER_HEADING)
}
