//! Blocking client for the Zotero web API (v3).

use crate::attachment::AttachmentFetcher;
use crate::config::{LibraryType, ZoteroConfig};
use crate::error::{Error, Result};
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Items per page; the API caps `limit` at 100
const PAGE_SIZE: usize = 100;

const API_VERSION: &str = "3";

pub struct ZoteroClient {
    http: Client,
    base: Url,
    library_type: LibraryType,
    library_id: String,
    api_key: Option<String>,
}

impl ZoteroClient {
    pub fn new(
        base_url: &str,
        library_type: LibraryType,
        library_id: &str,
        api_key: Option<String>,
    ) -> Result<Self> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("Invalid Zotero base URL '{}': {}", base_url, e)))?;
        let http = Client::builder()
            .user_agent(concat!("refsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            library_type,
            library_id: library_id.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &ZoteroConfig) -> Result<Self> {
        let library_id = config
            .library_id
            .as_deref()
            .ok_or_else(|| Error::Config("zotero.library_id is not set".to_string()))?;
        Self::new(&config.base_url, config.library_type, library_id, config.api_key())
    }

    /// URL of a path below this library, e.g. `items/ABCD1234/file`
    pub fn library_url(&self, path: &str) -> Result<Url> {
        let relative = format!(
            "{}/{}/{}",
            self.library_type.path_segment(),
            self.library_id,
            path
        );
        self.base
            .join(&relative)
            .map_err(|e| Error::Config(format!("Invalid library path '{}': {}", relative, e)))
    }

    fn get(&self, url: &Url) -> Result<Response> {
        let mut request = self
            .http
            .get(url.clone())
            .header("Zotero-API-Version", API_VERSION);
        if let Some(key) = &self.api_key {
            request = request.header("Zotero-API-Key", key);
        }
        let response = request.send()?;
        if !response.status().is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Fetch every item in the library, following `start`/`limit` paging.
    pub fn fetch_items(&self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut start = 0usize;

        loop {
            let mut url = self.library_url("items")?;
            url.query_pairs_mut()
                .append_pair("format", "json")
                .append_pair("limit", &PAGE_SIZE.to_string())
                .append_pair("start", &start.to_string());

            let page: Vec<Value> = self.get(&url)?.json()?;
            let count = page.len();
            log::debug!("[zotero] fetched {} items starting at {}", count, start);
            items.extend(page);

            if count < PAGE_SIZE {
                break;
            }
            start += count;
        }

        log::info!("Fetched {} items from Zotero library {}", items.len(), self.library_id);
        Ok(items)
    }

    /// Raw bytes of an attachment's stored file
    pub fn download_file(&self, attachment_key: &str) -> Result<Vec<u8>> {
        let url = self.library_url(&format!("items/{}/file", attachment_key))?;
        let bytes = self.get(&url)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

impl AttachmentFetcher for ZoteroClient {
    fn dump(&self, attachment_key: &str, file_name: &str, target_dir: &Path) -> Result<PathBuf> {
        let bytes = self.download_file(attachment_key)?;
        fs::create_dir_all(target_dir).map_err(|e| Error::io(target_dir, e))?;
        let path = target_dir.join(file_name);
        crate::atomic_write_file(&path, &bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_url_for_user_library() {
        let client =
            ZoteroClient::new("https://api.zotero.org", LibraryType::User, "12345", None).unwrap();
        let url = client.library_url("items/ABCD/file").unwrap();
        assert_eq!(url.as_str(), "https://api.zotero.org/users/12345/items/ABCD/file");
    }

    #[test]
    fn test_library_url_keeps_base_path() {
        let client =
            ZoteroClient::new("http://localhost:8080/zotero/", LibraryType::Group, "77", None)
                .unwrap();
        let url = client.library_url("items").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/zotero/groups/77/items");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ZoteroClient::new("not a url", LibraryType::User, "1", None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
