//! Header synthesis for notes that do not have one yet.
//!
//! Callers check [`Note::has_header`] first; nothing here looks at the
//! existing content.

use crate::error::{Error, Result};
use crate::frontmatter::types::Literature;
use crate::frontmatter::FrontmatterParser;
use crate::library::BibRecord;
use crate::note::Note;

/// Build the header text for `record`, failing on the first absent required
/// field (citekey, zotero link, title, year, in that order).
pub fn synthesize(record: &BibRecord) -> Result<String> {
    if record.citekey.is_none() {
        return Err(Error::MissingField("data.citekey"));
    }
    if record.zotero_link.is_none() {
        return Err(Error::MissingField("data.zotero_link"));
    }
    if record.title.is_none() {
        return Err(Error::MissingField("data.title"));
    }
    if record.year.is_none() {
        return Err(Error::MissingField("data.year"));
    }

    Ok(FrontmatterParser::render_header(&Literature::from_record(record)))
}

/// Prepend a freshly synthesized header to `note`. On error the file is
/// untouched.
pub fn add_header(note: &Note, record: &BibRecord) -> Result<()> {
    let header = synthesize(record)?;
    note.prepend(&header)?;
    log::info!("Added YAML header to {}", note.title);
    Ok(())
}
