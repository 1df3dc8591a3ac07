//! Vault layout and directory listings.

use crate::attachment::PDF_DIR;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct VaultLayout {
    pub references_dir: PathBuf,
}

impl VaultLayout {
    pub fn new(vault_path: &Path, references: &str) -> Self {
        Self {
            references_dir: vault_path.join(references),
        }
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.references_dir.join(PDF_DIR)
    }

    /// Note file names in the references directory, sorted
    pub fn list_notes(&self) -> Result<Vec<String>> {
        if !self.references_dir.is_dir() {
            return Err(Error::io(
                &self.references_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "references directory not found"),
            ));
        }
        list_files_in_directory(&self.references_dir, "md")
    }

    /// PDF file names already downloaded; empty when the folder does not exist yet
    pub fn list_pdfs(&self) -> Result<HashSet<String>> {
        Ok(list_files_in_directory(&self.pdf_dir(), "pdf")?
            .into_iter()
            .collect())
    }
}

/// List files in a directory (not recursive) with a specific extension.
/// Hidden files are skipped; a missing directory yields an empty list.
pub fn list_files_in_directory(dir_path: &Path, extension: &str) -> Result<Vec<String>> {
    if !dir_path.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<String> = Vec::new();
    let ext_with_dot = format!(".{}", extension);

    for entry in WalkDir::new(dir_path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error"));
            Error::io(dir_path, io)
        })?;
        let file_name = entry.file_name().to_string_lossy().to_string();

        if file_name.starts_with('.') {
            continue;
        }
        if entry.file_type().is_file() && file_name.ends_with(&ext_with_dot) {
            files.push(file_name);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_notes_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let layout = VaultLayout::new(temp_dir.path(), "References");
        fs::create_dir_all(layout.pdf_dir()).unwrap();
        fs::write(layout.references_dir.join("@b.md"), "").unwrap();
        fs::write(layout.references_dir.join("@a.md"), "").unwrap();
        fs::write(layout.references_dir.join(".hidden.md"), "").unwrap();
        fs::write(layout.references_dir.join("image.png"), "").unwrap();
        fs::create_dir_all(layout.references_dir.join("sub.md")).unwrap();
        fs::write(layout.pdf_dir().join("@a.pdf"), "").unwrap();

        assert_eq!(layout.list_notes().unwrap(), vec!["@a.md", "@b.md"]);
        let pdfs = layout.list_pdfs().unwrap();
        assert_eq!(pdfs.len(), 1);
        assert!(pdfs.contains("@a.pdf"));
    }

    #[test]
    fn test_missing_pdf_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let layout = VaultLayout::new(temp_dir.path(), "References");
        fs::create_dir_all(&layout.references_dir).unwrap();
        assert!(layout.list_pdfs().unwrap().is_empty());
    }

    #[test]
    fn test_missing_references_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let layout = VaultLayout::new(temp_dir.path(), "Nope");
        assert!(matches!(layout.list_notes(), Err(Error::Io { .. })));
    }
}
