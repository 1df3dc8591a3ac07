//! Per-note sync pipeline: match, add header, fetch PDF, embed.
//!
//! Notes are processed one by one in the order given. Every per-note failure
//! is logged and recorded in the [`SyncReport`]; none aborts the run.

use crate::attachment::{
    self, AttachmentFetcher, AttachmentResolver, DownloadOutcome, EmbedOutcome, PDF_DIR,
};
use crate::error::{Error, Result};
use crate::header;
use crate::library::Library;
use crate::matcher::Matcher;
use crate::note::Note;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum NoteOutcome {
    /// No record carries the note's title as citekey
    Unmatched,
    /// The matched record lacks a field the header needs
    MissingField(&'static str),
    Processed {
        header_added: bool,
        download: DownloadOutcome,
        embed: EmbedOutcome,
    },
    /// Reading or writing the note failed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteReport {
    pub file_name: String,
    pub outcome: NoteOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub notes: Vec<NoteReport>,
}

impl SyncReport {
    fn count(&self, pred: impl Fn(&NoteOutcome) -> bool) -> usize {
        self.notes.iter().filter(|n| pred(&n.outcome)).count()
    }

    pub fn unmatched(&self) -> usize {
        self.count(|o| matches!(o, NoteOutcome::Unmatched))
    }

    pub fn missing_fields(&self) -> usize {
        self.count(|o| matches!(o, NoteOutcome::MissingField(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, NoteOutcome::Failed(_)))
    }

    pub fn headers_added(&self) -> usize {
        self.count(|o| matches!(o, NoteOutcome::Processed { header_added: true, .. }))
    }

    pub fn downloads(&self) -> usize {
        self.count(|o| {
            matches!(o, NoteOutcome::Processed { download: DownloadOutcome::Downloaded(_), .. })
        })
    }

    pub fn download_failures(&self) -> usize {
        self.count(|o| {
            matches!(o, NoteOutcome::Processed { download: DownloadOutcome::Failed(_), .. })
        })
    }

    pub fn embeds(&self) -> usize {
        self.count(|o| matches!(o, NoteOutcome::Processed { embed: EmbedOutcome::Embedded, .. }))
    }

    /// True when the run changed no file
    pub fn is_noop(&self) -> bool {
        self.headers_added() == 0 && self.downloads() == 0 && self.embeds() == 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notes: {} headers added, {} PDFs downloaded, {} embeds added, \
             {} unmatched, {} missing fields, {} download errors, {} failed",
            self.notes.len(),
            self.headers_added(),
            self.downloads(),
            self.embeds(),
            self.unmatched(),
            self.missing_fields(),
            self.download_failures(),
            self.failed()
        )
    }
}

/// Everything one run needs, passed explicitly to each stage.
pub struct SyncContext<'a> {
    pub library: &'a Library,
    pub fetcher: &'a dyn AttachmentFetcher,
    pub references_dir: PathBuf,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        library: &'a Library,
        fetcher: &'a dyn AttachmentFetcher,
        references_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            library,
            fetcher,
            references_dir: references_dir.into(),
        }
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.references_dir.join(PDF_DIR)
    }

    /// Process `md_files` (file names inside the references directory).
    /// `known_pdfs` lists the file names already in the PDF directory.
    pub fn process_markdown_files(
        &self,
        md_files: &[String],
        mut known_pdfs: HashSet<String>,
    ) -> SyncReport {
        let matcher = Matcher::new(&self.library.records);
        let resolver =
            AttachmentResolver::new(&self.library.attachments, self.fetcher, self.pdf_dir());
        let mut report = SyncReport::default();

        for md_file in md_files {
            log::info!("Processing file: {}", md_file);
            let outcome = match self.process_note(md_file, &matcher, &resolver, &mut known_pdfs) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Failed to process {}: {}", md_file, e);
                    NoteOutcome::Failed(e.to_string())
                }
            };
            report.notes.push(NoteReport {
                file_name: md_file.clone(),
                outcome,
            });
        }

        log::info!("{}", report);
        report
    }

    fn process_note(
        &self,
        md_file: &str,
        matcher: &Matcher<'_>,
        resolver: &AttachmentResolver<'_>,
        known_pdfs: &mut HashSet<String>,
    ) -> Result<NoteOutcome> {
        let note = Note::in_dir(&self.references_dir, md_file)?;
        let has_header = note.has_header()?;

        let Some(record) = matcher.find(&note.title) else {
            log::warn!("No matching item found for {}. Skipping file.", note.title);
            return Ok(NoteOutcome::Unmatched);
        };

        let mut header_added = false;
        if !has_header {
            match header::add_header(&note, record) {
                Ok(()) => header_added = true,
                Err(Error::MissingField(field)) => {
                    log::warn!(
                        "Missing required field '{}' for {}. Skipping file.",
                        field,
                        note.title
                    );
                    return Ok(NoteOutcome::MissingField(field));
                }
                Err(e) => return Err(e),
            }
        }

        let download = resolver.ensure_pdf(record, &note.title, known_pdfs);
        let embed = attachment::embed_pdf_section(&note)?;

        Ok(NoteOutcome::Processed {
            header_added,
            download,
            embed,
        })
    }
}
