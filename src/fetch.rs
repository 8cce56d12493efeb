//! Retrieval of JSON documents: identity tables and bibliographic datasets.
//!
//! Production documents live in version-controlled repositories and are
//! fetched over HTTP. Local paths are accepted as well, which keeps offline
//! deployments and tests off the network.

use std::fmt;
use std::path::PathBuf;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};

/// Where a JSON document is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DocumentLocation {
    Url(String),
    Path(PathBuf),
}

impl From<String> for DocumentLocation {
    fn from(s: String) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            DocumentLocation::Url(s)
        } else if let Some(path) = s.strip_prefix("file://") {
            DocumentLocation::Path(PathBuf::from(path))
        } else {
            DocumentLocation::Path(PathBuf::from(s))
        }
    }
}

impl From<&str> for DocumentLocation {
    fn from(s: &str) -> Self {
        DocumentLocation::from(s.to_string())
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLocation::Url(url) => f.write_str(url),
            DocumentLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches documents one at a time, in the order they are requested.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Fetcher {
            client: Client::new(),
        }
    }

    /// Read and parse the document at `location`.
    pub async fn fetch(&self, location: &DocumentLocation) -> CatalogResult<Value> {
        let fetch_err = |reason: String| CatalogError::Fetch {
            location: location.to_string(),
            reason,
        };

        match location {
            DocumentLocation::Url(url) => {
                log::info!("Fetching {}", url);
                let res = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| fetch_err(e.to_string()))?;

                if !res.status().is_success() {
                    return Err(fetch_err(format!("status {}", res.status())));
                }

                res.json::<Value>()
                    .await
                    .map_err(|e| fetch_err(e.to_string()))
            }
            DocumentLocation::Path(path) => {
                log::info!("Reading {}", path.display());
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| fetch_err(e.to_string()))?;
                serde_json::from_slice(&bytes).map_err(|e| fetch_err(e.to_string()))
            }
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
