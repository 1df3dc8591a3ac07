use crate::library::BibRecord;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The single tag every literature note carries
pub const PAPER_TAG: &str = "paper";

// Accept `null`, a single string, or a list of scalars
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                _ => Err(Error::custom("list entries must be scalars")),
            })
            .collect(),
        _ => Err(Error::custom("expected a list of strings")),
    }
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalized view of a paper, built either from a library record or from an
/// existing note header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Literature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citekey: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "zotero", default, skip_serializing_if = "Option::is_none")]
    pub zotero_link: Option<String>,

    #[serde(rename = "abstract", default, deserialize_with = "deserialize_null_as_empty")]
    pub abstract_note: String,

    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub aliases: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub tags: Vec<String>,

    /// Properties outside the core set, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Literature {
    /// Project a library record. Missing creator or year render as empty
    /// inside the aliases.
    pub fn from_record(record: &BibRecord) -> Self {
        let creator = record.creator_summary.as_deref().unwrap_or("");
        let year = record.year.map(|y| y.to_string()).unwrap_or_default();
        let title = record.title.clone();

        let mut aliases = vec![
            format!("{} ({})", creator, year),
            format!("{}, ({})", creator, year),
        ];
        aliases.extend(title.clone());

        Self {
            citekey: record.citekey.clone(),
            title,
            zotero_link: record.zotero_link.clone(),
            abstract_note: record.abstract_note.clone().unwrap_or_default(),
            aliases,
            tags: vec![PAPER_TAG.to_string()],
            extra: BTreeMap::new(),
        }
    }

    /// Build from an already-parsed header mapping
    pub fn from_frontmatter(map: serde_yaml::Mapping) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(map))
    }

    pub fn is_paper(&self) -> bool {
        self.tags.iter().any(|t| t == PAPER_TAG)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}
