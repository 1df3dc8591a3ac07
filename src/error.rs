//! Error types for refsync.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using refsync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failed on a specific path
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bibliographic record lacks a field the header needs
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Frontmatter could not be parsed or serialized
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Library export or API payload was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request to the reference manager failed
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Reference manager answered with a non-success status
    #[error("Zotero API returned {status} for {url}")]
    Api { status: u16, url: String },

    /// Library data had an unexpected shape
    #[error("Invalid library data: {0}")]
    InvalidLibrary(String),

    /// Frontmatter schema could not be compiled
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
