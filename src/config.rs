use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "refsync.toml";

/// Environment variable consulted when `zotero.api_key` is not set
pub const API_KEY_ENV: &str = "ZOTERO_API_KEY";

/// Top-level configuration for refsync.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vault: VaultConfig,
    pub library: LibraryConfig,
    pub zotero: ZoteroConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("parsing {}: {}", path.display(), e)))
    }

    /// Load `explicit` if given, else `refsync.toml` in the working directory
    /// if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::debug!("Using config file {:?}", fallback);
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.vault.path.is_none() {
            return Err(Error::Config(
                "vault.path must be set (or pass --vault)".to_string(),
            ));
        }
        if self.vault.references.trim().is_empty() {
            return Err(Error::Config("vault.references must not be empty".to_string()));
        }
        if self.library.export_path.is_none() && self.zotero.library_id.is_none() {
            return Err(Error::Config(
                "either library.export_path or zotero.library_id must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// `<vault>/<references>`
    pub fn references_dir(&self) -> Result<PathBuf> {
        let vault = self
            .vault
            .path
            .as_ref()
            .ok_or_else(|| Error::Config("vault.path is not set".to_string()))?;
        Ok(vault.join(&self.vault.references))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root directory.
    pub path: Option<PathBuf>,
    /// Folder inside the vault holding one note per reference.
    pub references: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: None,
            references: "References".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// JSON array of Zotero API items; when unset the library is fetched live.
    pub export_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    #[default]
    User,
    Group,
}

impl LibraryType {
    pub fn path_segment(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoteroConfig {
    pub library_id: Option<String>,
    pub library_type: LibraryType,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for ZoteroConfig {
    fn default() -> Self {
        Self {
            library_id: None,
            library_type: LibraryType::User,
            api_key: None,
            base_url: "https://api.zotero.org".into(),
        }
    }
}

impl ZoteroConfig {
    /// Configured key, falling back to `ZOTERO_API_KEY`
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }
}
