//! Read-only health report over the references directory.

use crate::frontmatter::types::ValidationError;
use crate::frontmatter::{FrontmatterParser, HEADER_DELIMITER};
use crate::library::Library;
use crate::note::{contains_paper_heading, Note};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum AuditIssue {
    NoHeader,
    UnparseableHeader(String),
    SchemaViolation(Vec<ValidationError>),
    /// Header citekey not present in the library
    UnknownCitekey(String),
    MissingPaperSection,
    ReadFailed(String),
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::NoHeader => write!(f, "no YAML header"),
            AuditIssue::UnparseableHeader(e) => write!(f, "unparseable header: {}", e),
            AuditIssue::SchemaViolation(errors) => {
                let parts: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        if e.path.is_empty() {
                            e.message.clone()
                        } else {
                            format!("{}: {}", e.path, e.message)
                        }
                    })
                    .collect();
                write!(f, "header violates schema ({})", parts.join("; "))
            }
            AuditIssue::UnknownCitekey(key) => write!(f, "citekey {} not found in library", key),
            AuditIssue::MissingPaperSection => write!(f, "no # Paper section"),
            AuditIssue::ReadFailed(e) => write!(f, "cannot read: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditFinding {
    pub file_name: String,
    pub issue: AuditIssue,
}

/// Inspect every note and collect problems. Never writes.
pub fn audit_notes(references_dir: &Path, md_files: &[String], library: &Library) -> Vec<AuditFinding> {
    let citekeys: HashSet<&str> = library
        .records
        .iter()
        .filter_map(|r| r.citekey.as_deref())
        .filter(|c| !c.is_empty())
        .collect();

    let mut findings = Vec::new();
    for md_file in md_files {
        for issue in audit_note(&references_dir.join(md_file), &citekeys) {
            log::debug!("[audit] {}: {}", md_file, issue);
            findings.push(AuditFinding {
                file_name: md_file.clone(),
                issue,
            });
        }
    }
    findings
}

fn audit_note(path: &Path, citekeys: &HashSet<&str>) -> Vec<AuditIssue> {
    let content = match Note::new(path).and_then(|note| note.read()) {
        Ok(c) => c,
        Err(e) => return vec![AuditIssue::ReadFailed(e.to_string())],
    };

    let mut issues = Vec::new();
    match FrontmatterParser::parse(&content) {
        Ok((None, _)) if content.starts_with(HEADER_DELIMITER) => {
            issues.push(AuditIssue::UnparseableHeader("unclosed header".to_string()))
        }
        Ok((None, _)) => issues.push(AuditIssue::NoHeader),
        Ok((Some(lit), _)) => {
            match FrontmatterParser::validate(&lit) {
                Ok(errors) if !errors.is_empty() => issues.push(AuditIssue::SchemaViolation(errors)),
                Ok(_) => {}
                Err(e) => issues.push(AuditIssue::UnparseableHeader(e.to_string())),
            }
            if let Some(key) = lit.citekey.as_deref().filter(|k| !k.is_empty()) {
                if !citekeys.contains(key) {
                    issues.push(AuditIssue::UnknownCitekey(key.to_string()));
                }
            }
        }
        Err(e) => issues.push(AuditIssue::UnparseableHeader(e.to_string())),
    }

    if !contains_paper_heading(&content) {
        issues.push(AuditIssue::MissingPaperSection);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::BibRecord;
    use crate::library::Year;
    use std::fs;
    use tempfile::TempDir;

    fn library() -> Library {
        Library {
            records: vec![BibRecord {
                item_key: "K1".into(),
                citekey: Some("@Smith2020".into()),
                title: Some("Deep Notes".into()),
                zotero_link: Some("zotero://select/items/K1".into()),
                abstract_note: None,
                year: Some(Year::Known(2020)),
                creator_summary: Some("Smith".into()),
                extra: None,
                date: None,
            }],
            attachments: vec![],
        }
    }

    const GOOD: &str = "---\ntitle: \"Deep Notes\"\ncitekey: \"@Smith2020\"\nzotero: zotero://select/items/K1\n\
abstract: \"\"\naliases: \n  - Smith (2020)\n  - Smith, (2020)\n  - \"Deep Notes\"\ntags:\n  - paper\n---\n\
\n# Paper\n\n![PDF](pdfs/@Smith2020.pdf)\n";

    #[test]
    fn test_clean_note_has_no_findings() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("@Smith2020.md"), GOOD).unwrap();
        let findings = audit_notes(temp_dir.path(), &["@Smith2020.md".to_string()], &library());
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_reports_each_problem() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("plain.md"), "just text\n").unwrap();
        fs::write(temp_dir.path().join("broken.md"), "---\ntitle: [oops\n---\n# Paper\n").unwrap();
        fs::write(
            temp_dir.path().join("@Other.md"),
            GOOD.replace("@Smith2020", "@Other2001").replace("  - paper\n", "  - unread\n"),
        )
        .unwrap();

        let files = vec![
            "plain.md".to_string(),
            "broken.md".to_string(),
            "@Other.md".to_string(),
            "gone.md".to_string(),
        ];
        let findings = audit_notes(temp_dir.path(), &files, &library());
        let issues_for = |name: &str| -> Vec<&AuditIssue> {
            findings.iter().filter(|f| f.file_name == name).map(|f| &f.issue).collect()
        };

        assert_eq!(
            issues_for("plain.md"),
            vec![&AuditIssue::NoHeader, &AuditIssue::MissingPaperSection]
        );
        assert!(matches!(issues_for("broken.md")[..], [AuditIssue::UnparseableHeader(_)]));

        let other = issues_for("@Other.md");
        assert!(matches!(other[0], AuditIssue::SchemaViolation(_)));
        assert_eq!(other[1], &AuditIssue::UnknownCitekey("@Other2001".into()));
        assert_eq!(other.len(), 2);

        assert!(matches!(issues_for("gone.md")[..], [AuditIssue::ReadFailed(_)]));
    }

    #[test]
    fn test_unclosed_header_is_unparseable_not_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("@Smith2020.md");
        fs::write(&path, "---\ntitle: x\nbody\n").unwrap();

        // Sync treats this note as already having a header
        assert!(Note::new(&path).unwrap().has_header().unwrap());

        let findings = audit_notes(temp_dir.path(), &["@Smith2020.md".to_string()], &library());
        let issues: Vec<&AuditIssue> = findings.iter().map(|f| &f.issue).collect();
        assert_eq!(
            issues,
            vec![
                &AuditIssue::UnparseableHeader("unclosed header".into()),
                &AuditIssue::MissingPaperSection,
            ]
        );
    }
}
