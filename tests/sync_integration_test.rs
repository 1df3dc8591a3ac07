//! End-to-end tests against the public API
//!
//! A library export is written to disk, loaded like the CLI does, and the sync
//! pipeline runs over a temp vault with an in-memory fetcher.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use refsync_lib::attachment::AttachmentFetcher;
use refsync_lib::audit::{audit_notes, AuditIssue};
use refsync_lib::library::Library;
use refsync_lib::sync::SyncContext;
use refsync_lib::vault::VaultLayout;
use tempfile::TempDir;

struct CountingFetcher {
    calls: Cell<usize>,
}

impl AttachmentFetcher for CountingFetcher {
    fn dump(
        &self,
        attachment_key: &str,
        file_name: &str,
        target_dir: &Path,
    ) -> refsync_lib::Result<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        let path = target_dir.join(file_name);
        fs::write(&path, format!("%PDF {}", attachment_key))
            .map_err(|e| refsync_lib::Error::io(&path, e))?;
        Ok(path)
    }
}

const EXPORT: &str = r#"[
  {
    "key": "SMITH001",
    "version": 3,
    "meta": { "creatorSummary": "Smith" },
    "data": {
      "key": "SMITH001",
      "itemType": "journalArticle",
      "title": "Deep Notes",
      "citekey": "Smith2020",
      "date": "2020",
      "abstractNote": ""
    }
  },
  {
    "key": "PDF00001",
    "links": { "enclosure": { "type": "application/pdf" } },
    "data": { "key": "PDF00001", "itemType": "attachment", "parentItem": "SMITH001" }
  },
  {
    "key": "PDF00002",
    "links": { "enclosure": { "type": "application/pdf" } },
    "data": { "key": "PDF00002", "itemType": "attachment", "parentItem": "SMITH001" }
  }
]"#;

fn setup() -> (TempDir, VaultLayout, Library) {
    let temp_dir = TempDir::new().unwrap();
    let export_path = temp_dir.path().join("items.json");
    fs::write(&export_path, EXPORT).unwrap();
    let library = Library::load_export(&export_path).unwrap();

    let layout = VaultLayout::new(&temp_dir.path().join("Vault"), "References");
    fs::create_dir_all(&layout.references_dir).unwrap();
    (temp_dir, layout, library)
}

fn sync(layout: &VaultLayout, library: &Library, fetcher: &CountingFetcher) -> refsync_lib::sync::SyncReport {
    let md_files = layout.list_notes().unwrap();
    let known = layout.list_pdfs().unwrap();
    SyncContext::new(library, fetcher, &layout.references_dir).process_markdown_files(&md_files, known)
}

#[test]
fn test_explicit_citekey_note_round_trip() {
    let (_tmp, layout, library) = setup();
    let note_path = layout.references_dir.join("Smith2020.md");
    fs::write(&note_path, "Reading notes\n").unwrap();
    let fetcher = CountingFetcher { calls: Cell::new(0) };

    let report = sync(&layout, &library, &fetcher);
    assert_eq!(report.headers_added(), 1);
    assert_eq!(fetcher.calls.get(), 1);

    let expected = "---\n\
title: \"Deep Notes\"\n\
citekey: \"Smith2020\"\n\
zotero: zotero://select/items/SMITH001\n\
abstract: \"\"\n\
aliases: \n  - Smith (2020)\n  - Smith, (2020)\n  - \"Deep Notes\"\n\
tags:\n  - paper\n\
---\n\
Reading notes\n\
\n# Paper\n\n![PDF](pdfs/Smith2020.pdf)\n";
    assert_eq!(fs::read_to_string(&note_path).unwrap(), expected);

    // First PDF row in table order is the one fetched
    assert_eq!(
        fs::read_to_string(layout.pdf_dir().join("Smith2020.pdf")).unwrap(),
        "%PDF PDF00001"
    );

    let report = sync(&layout, &library, &fetcher);
    assert!(report.is_noop());
    assert_eq!(fetcher.calls.get(), 1);
    assert_eq!(fs::read_to_string(&note_path).unwrap(), expected);
}

#[test]
fn test_audit_after_sync_is_clean() {
    let (_tmp, layout, library) = setup();
    fs::write(layout.references_dir.join("Smith2020.md"), "").unwrap();
    fs::write(layout.references_dir.join("Stray.md"), "loose note\n").unwrap();
    let fetcher = CountingFetcher { calls: Cell::new(0) };

    let md_files = layout.list_notes().unwrap();
    let before = audit_notes(&layout.references_dir, &md_files, &library);
    assert!(before
        .iter()
        .any(|f| f.file_name == "Smith2020.md" && f.issue == AuditIssue::NoHeader));

    sync(&layout, &library, &fetcher);

    let after = audit_notes(&layout.references_dir, &md_files, &library);
    assert!(after.iter().all(|f| f.file_name == "Stray.md"), "{:?}", after);
    assert_eq!(
        fs::read_to_string(layout.references_dir.join("Stray.md")).unwrap(),
        "loose note\n"
    );
}
