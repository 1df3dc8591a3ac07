//! Derivation of citekey, year and zotero link from raw Zotero fields.

use chrono::{DateTime, Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker Better BibTeX writes into the `extra` field
pub const CITATION_KEY_MARKER: &str = "Citation Key: ";

static BARE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());
static YEAR_MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());

const DAY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d %H:%M:%S",
];

const MONTH_FORMATS: &[&str] = &["%B %Y %d", "%b %Y %d"];

/// Extract the citekey from the `extra` field, prefixed with `@`.
///
/// Returns `None` when the field is absent, empty, lacks the marker, or the
/// marker is followed by nothing.
pub fn citekey_from_extra(extra: Option<&str>) -> Option<String> {
    let extra = extra.filter(|e| !e.is_empty())?;
    let (_, after) = extra.split_once(CITATION_KEY_MARKER)?;
    let key = after.split('\n').next().unwrap_or("").trim_end();
    if key.is_empty() {
        return None;
    }
    Some(format!("@{}", key))
}

/// Best-effort year extraction from a free-text date field.
pub fn year_from_date(date: Option<&str>) -> Option<i32> {
    let date = date.map(str::trim).filter(|d| !d.is_empty())?;

    if let Some(cap) = BARE_YEAR_RE.captures(date) {
        return cap[1].parse().ok();
    }

    if let Some(cap) = YEAR_MONTH_RE.captures(date) {
        let month: u32 = cap[2].parse().ok()?;
        if (1..=12).contains(&month) {
            return cap[1].parse().ok();
        }
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.year());
    }

    for fmt in DAY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date, fmt) {
            return Some(d.year());
        }
    }

    // "March 2021" has no day; pin it to the first
    let with_day = format!("{} 1", date);
    for fmt in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&with_day, fmt) {
            return Some(d.year());
        }
    }

    None
}

/// Build a `zotero://select` link for an item key
pub fn zotero_link_for(item_key: &str) -> String {
    format!("zotero://select/items/{}", item_key)
}
