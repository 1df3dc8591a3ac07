pub mod types;
pub mod schemas;

use crate::error::{Error, Result};
use jsonschema::Validator;
use schemas::LITERATURE_SCHEMA;
use std::fmt::Write;
use types::{Literature, ValidationError};

/// Opening and closing line of a YAML header
pub const HEADER_DELIMITER: &str = "---";

/// Position of the title among the rendered aliases
const TITLE_ALIAS_SLOT: usize = 2;

pub struct FrontmatterParser;

impl FrontmatterParser {
    /// Split content into (yaml, body). `None` when there is no complete
    /// header block.
    pub fn split(content: &str) -> Option<(&str, &str)> {
        if !content.starts_with(HEADER_DELIMITER) {
            return None;
        }

        // Find the closing ---
        let end_idx = content[3..].find("\n---")?;
        let yaml = &content[3..end_idx + 3];
        let body_start = end_idx + 3 + 4; // skip "\n---"
        let body = if body_start < content.len() {
            content[body_start..].trim_start_matches('\n')
        } else {
            ""
        };
        Some((yaml, body))
    }

    /// Parse a note into its literature header (if any) and body
    pub fn parse(content: &str) -> Result<(Option<Literature>, String)> {
        match Self::split(content) {
            Some((yaml, body)) => Ok((Some(Self::parse_yaml(yaml)?), body.to_string())),
            None => Ok((None, content.to_string())),
        }
    }

    /// Parse only the header YAML
    pub fn parse_yaml(yaml_str: &str) -> Result<Literature> {
        if yaml_str.trim().is_empty() {
            return Ok(Literature::default());
        }
        let map: serde_yaml::Mapping = serde_yaml::from_str(yaml_str)?;
        Ok(Literature::from_frontmatter(map)?)
    }

    /// Render the fixed-layout header written into new literature notes.
    ///
    /// The third alias (the title) is quoted like the title itself; the two
    /// author-year aliases before it are written bare. Extension properties are not
    /// rendered.
    pub fn render_header(lit: &Literature) -> String {
        let title = lit.title.as_deref().unwrap_or("");
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", HEADER_DELIMITER);
        let _ = writeln!(out, "title: \"{}\"", title);
        let _ = writeln!(out, "citekey: \"{}\"", lit.citekey.as_deref().unwrap_or(""));
        let _ = writeln!(out, "zotero: {}", lit.zotero_link.as_deref().unwrap_or(""));
        let _ = writeln!(out, "abstract: \"{}\"", lit.abstract_note);
        out.push_str("aliases: \n");
        for (i, alias) in lit.aliases.iter().enumerate() {
            if i == TITLE_ALIAS_SLOT {
                let _ = writeln!(out, "  - \"{}\"", alias);
            } else {
                let _ = writeln!(out, "  - {}", alias);
            }
        }
        out.push_str("tags:\n");
        for tag in &lit.tags {
            let _ = writeln!(out, "  - {}", tag);
        }
        let _ = writeln!(out, "{}", HEADER_DELIMITER);
        out
    }

    /// Validate a literature header against the JSON Schema
    pub fn validate(lit: &Literature) -> Result<Vec<ValidationError>> {
        let json_value = serde_json::to_value(lit)?;

        let schema_value: &serde_json::Value = &LITERATURE_SCHEMA;
        let compiled_schema = Validator::new(schema_value)
            .map_err(|e| Error::Schema(format!("Failed to compile schema: {}", e)))?;

        let mut errors = Vec::new();
        if let Err(validation_errors) = compiled_schema.validate(&json_value) {
            for error in validation_errors {
                errors.push(ValidationError {
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                });
            }
        }

        Ok(errors)
    }
}
