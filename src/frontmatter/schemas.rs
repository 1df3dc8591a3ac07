use lazy_static::lazy_static;
use serde_json::json;

lazy_static! {
    pub static ref LITERATURE_SCHEMA: serde_json::Value = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Literature Note Schema",
        "type": "object",
        "required": ["title", "citekey", "zotero", "aliases", "tags"],
        "properties": {
            "title": {
                "type": "string",
                "minLength": 1,
                "description": "Paper title"
            },
            "citekey": {
                "type": "string",
                "minLength": 1,
                "description": "Citation key, also the note's file name"
            },
            "zotero": {
                "type": "string",
                "pattern": "^zotero://",
                "description": "zotero://select link back to the library item"
            },
            "abstract": {
                "type": "string"
            },
            "aliases": {
                "type": "array",
                "minItems": 1,
                "items": { "type": "string" }
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "contains": { "const": "paper" }
            }
        }
    });
}
