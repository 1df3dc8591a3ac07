//! PDF attachment resolution, download and embedding.

use crate::error::{Error, Result};
use crate::library::{AttachmentCandidate, BibRecord};
use crate::note::Note;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Folder under the references directory holding downloaded PDFs
pub const PDF_DIR: &str = "pdfs";

/// Writes an attachment's bytes to `target_dir/file_name`.
pub trait AttachmentFetcher {
    fn dump(&self, attachment_key: &str, file_name: &str, target_dir: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    /// `<title>.pdf` was already in the known file list
    AlreadyPresent,
    Downloaded(PathBuf),
    /// The record has no PDF attachment
    NoAttachment,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    Embedded,
    AlreadyPresent,
}

pub struct AttachmentResolver<'a> {
    attachments: &'a [AttachmentCandidate],
    fetcher: &'a dyn AttachmentFetcher,
    pdf_dir: PathBuf,
}

impl<'a> AttachmentResolver<'a> {
    pub fn new(
        attachments: &'a [AttachmentCandidate],
        fetcher: &'a dyn AttachmentFetcher,
        pdf_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            attachments,
            fetcher,
            pdf_dir: pdf_dir.into(),
        }
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    /// First PDF attachment of `record` in table order
    pub fn find_candidate(&self, record: &BibRecord) -> Option<&'a AttachmentCandidate> {
        self.attachments.iter().find(|a| a.is_pdf_for(record))
    }

    /// Download the record's PDF as `<note title>.pdf` unless it is already
    /// known. Fetch errors are logged and reported, never propagated.
    pub fn ensure_pdf(
        &self,
        record: &BibRecord,
        note_title: &str,
        known_pdfs: &mut HashSet<String>,
    ) -> DownloadOutcome {
        let pdf_file = format!("{}.pdf", note_title);
        if known_pdfs.contains(&pdf_file) {
            log::debug!("PDF for {} already present", note_title);
            return DownloadOutcome::AlreadyPresent;
        }

        let Some(candidate) = self.find_candidate(record) else {
            log::warn!("No PDF attachment found for {} in Zotero.", note_title);
            return DownloadOutcome::NoAttachment;
        };

        match self.fetch(candidate, &pdf_file) {
            Ok(path) => {
                log::info!("Downloaded PDF for {}", note_title);
                known_pdfs.insert(pdf_file);
                DownloadOutcome::Downloaded(path)
            }
            Err(e) => {
                log::error!("Error downloading PDF for {}: {}", note_title, e);
                DownloadOutcome::Failed(e.to_string())
            }
        }
    }

    fn fetch(&self, candidate: &AttachmentCandidate, pdf_file: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.pdf_dir).map_err(|e| Error::io(&self.pdf_dir, e))?;
        self.fetcher
            .dump(&candidate.attachment_key, pdf_file, &self.pdf_dir)
    }
}

/// Append the `# Paper` section unless the note already has one.
pub fn embed_pdf_section(note: &Note) -> Result<EmbedOutcome> {
    if note.has_paper_section()? {
        return Ok(EmbedOutcome::AlreadyPresent);
    }
    note.append(&note.paper_section())?;
    log::info!("Embedded PDF for {} under # Paper section.", note.title);
    Ok(EmbedOutcome::Embedded)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records calls and writes placeholder bytes; fails for listed keys.
    #[derive(Default)]
    pub struct RecordingFetcher {
        pub calls: RefCell<Vec<(String, String)>>,
        pub failing_keys: Vec<String>,
    }

    impl RecordingFetcher {
        pub fn failing(keys: &[&str]) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failing_keys: keys.iter().map(|k| k.to_string()).collect(),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl AttachmentFetcher for RecordingFetcher {
        fn dump(&self, attachment_key: &str, file_name: &str, target_dir: &Path) -> Result<PathBuf> {
            self.calls
                .borrow_mut()
                .push((attachment_key.to_string(), file_name.to_string()));
            if self.failing_keys.iter().any(|k| k == attachment_key) {
                return Err(Error::Api {
                    status: 404,
                    url: format!("items/{}/file", attachment_key),
                });
            }
            let path = target_dir.join(file_name);
            fs::write(&path, b"%PDF-1.4 test").map_err(|e| Error::io(&path, e))?;
            Ok(path)
        }
    }
}
