//! Note-to-record matching by exact citekey.

use crate::library::BibRecord;

pub struct Matcher<'a> {
    records: &'a [BibRecord],
}

impl<'a> Matcher<'a> {
    pub fn new(records: &'a [BibRecord]) -> Self {
        Self { records }
    }

    /// First record whose citekey equals `title` exactly. Records without a
    /// citekey never match.
    pub fn find(&self, title: &str) -> Option<&'a BibRecord> {
        self.records
            .iter()
            .filter(|r| r.is_matchable())
            .find(|r| r.citekey.as_deref() == Some(title))
    }
}
