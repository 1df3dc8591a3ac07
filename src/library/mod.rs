//! In-memory bibliographic table loaded once per run.
//!
//! Zotero API items are nested JSON objects. They are flattened into rows with
//! dotted column names (`data.title`, `meta.creatorSummary`,
//! `links.enclosure.type`) and then projected into [`BibRecord`]s and
//! [`AttachmentCandidate`]s with explicit presence semantics per field.

pub mod extract;
pub mod zotero;

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// One flattened row of the bibliographic table.
///
/// A column missing from the map is *absent*; a column mapped to `null` is
/// *present but empty*.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Flatten a nested Zotero item into dotted columns. Arrays are kept as
    /// leaf values.
    pub fn from_item(item: &Value) -> Result<Self> {
        let obj = item
            .as_object()
            .ok_or_else(|| Error::InvalidLibrary("item is not a JSON object".to_string()))?;
        let mut columns = BTreeMap::new();
        flatten_into(&mut columns, "", obj);
        Ok(Self { columns })
    }

    pub fn has(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Textual value of a column; `None` when absent or null.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.columns.get(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Like [`Row::text`] but treats an empty string as absent.
    fn non_empty_text(&self, column: &str) -> Option<String> {
        self.text(column).filter(|s| !s.is_empty())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn flatten_into(columns: &mut BTreeMap<String, Value>, prefix: &str, obj: &Map<String, Value>) {
    for (key, value) in obj {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) => flatten_into(columns, &column, inner),
            other => {
                columns.insert(column, other.clone());
            }
        }
    }
}

/// Publication year of a record whose source carried year information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Year {
    Known(i32),
    /// The column exists but holds nothing parseable
    Unknown,
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(y) => write!(f, "{}", y),
            Year::Unknown => Ok(()),
        }
    }
}

impl Year {
    /// Interpret a `data.year` cell. Float years are truncated.
    fn from_value(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                    .or_else(|| extract::year_from_date(Some(s)).map(i64::from))
            }
            _ => None,
        };
        parsed
            .and_then(|y| i32::try_from(y).ok())
            .map(Year::Known)
            .unwrap_or(Year::Unknown)
    }
}

/// One bibliographic entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BibRecord {
    pub item_key: String,
    pub citekey: Option<String>,
    pub title: Option<String>,
    pub zotero_link: Option<String>,
    pub abstract_note: Option<String>,
    /// `None` when neither `data.year` nor `data.date` exists on the row
    pub year: Option<Year>,
    pub creator_summary: Option<String>,
    pub extra: Option<String>,
    pub date: Option<String>,
}

impl BibRecord {
    /// Project a row into a record, deriving citekey, year and link where the
    /// row has no explicit column for them.
    pub fn from_row(row: &Row) -> Option<Self> {
        let item_key = row.non_empty_text("key")?;
        let extra = row.text("data.extra");
        let date = row.text("data.date");

        let citekey = row
            .non_empty_text("data.citekey")
            .or_else(|| extract::citekey_from_extra(extra.as_deref()));

        let zotero_link = row
            .non_empty_text("data.zotero_link")
            .or_else(|| Some(extract::zotero_link_for(&item_key)));

        let year = match row.get("data.year") {
            Some(value) => Some(Year::from_value(value)),
            None if row.has("data.date") => Some(
                extract::year_from_date(date.as_deref())
                    .map(Year::Known)
                    .unwrap_or(Year::Unknown),
            ),
            None => None,
        };

        Some(Self {
            citekey,
            title: row.text("data.title"),
            zotero_link,
            abstract_note: row.text("data.abstractNote"),
            year,
            creator_summary: row.text("meta.creatorSummary"),
            extra,
            date,
            item_key,
        })
    }

    /// A record can only be matched when it has a non-empty citekey
    pub fn is_matchable(&self) -> bool {
        self.citekey.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// A possible file attachment of a parent item.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentCandidate {
    pub parent_item_key: String,
    pub attachment_key: String,
    pub mime_type: Option<String>,
}

impl AttachmentCandidate {
    pub fn from_row(row: &Row) -> Option<Self> {
        let parent_item_key = row.non_empty_text("data.parentItem")?;
        let attachment_key = row.non_empty_text("key")?;
        let mime_type = row
            .non_empty_text("links.enclosure.type")
            .or_else(|| row.non_empty_text("data.contentType"));
        Some(Self {
            parent_item_key,
            attachment_key,
            mime_type,
        })
    }

    pub fn is_pdf_for(&self, record: &BibRecord) -> bool {
        self.parent_item_key == record.item_key && self.mime_type.as_deref() == Some(PDF_MIME_TYPE)
    }
}

/// The loaded library: top-level items and their child attachments, in table
/// order.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub records: Vec<BibRecord>,
    pub attachments: Vec<AttachmentCandidate>,
}

impl Library {
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut library = Library::default();
        for row in rows {
            if row.non_empty_text("data.parentItem").is_some() {
                if let Some(att) = AttachmentCandidate::from_row(row) {
                    library.attachments.push(att);
                }
            } else if let Some(record) = BibRecord::from_row(row) {
                library.records.push(record);
            } else {
                log::debug!("Skipping library row without an item key");
            }
        }
        library
    }

    /// Build the library from raw Zotero API items
    pub fn from_items(items: &[Value]) -> Result<Self> {
        let rows = items.iter().map(Row::from_item).collect::<Result<Vec<_>>>()?;
        Ok(Self::from_rows(&rows))
    }

    /// Parse a JSON array of Zotero API items
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| Error::InvalidLibrary("expected a JSON array of items".to_string()))?;
        Self::from_items(items)
    }

    /// Load a library export written by the Zotero API or `refsync` itself
    pub fn load_export(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let library = Self::from_json_str(&content)?;
        log::info!(
            "Loaded {} records and {} attachments from {:?}",
            library.records.len(),
            library.attachments.len(),
            path
        );
        Ok(library)
    }

    pub fn matchable_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_matchable()).count()
    }
}
