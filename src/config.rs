//! Service configuration.
//!
//! Defaults describe the production deployment. `NOVELS_CONFIG` may name a
//! JSON file overriding any subset of fields; `NOVELS_BIND` and
//! `NOVELS_PORT` override the listen address last.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};
use crate::fetch::DocumentLocation;
use crate::merge::SourceKind;
use crate::texts::DigestAlgorithm;

pub const GARSIDE_NAMESPACE: &str = "garside-raven-schöwerling";
pub const NATIVE_NAMESPACE: &str = "novels-project";

const IDENTIFIERS_URL: &str =
    "https://github.com/novels-project/identifiers/raw/master/novels-project-identifiers.json";

const BRITISH_FICTION_URLS: [&str; 3] = [
    "https://raw.githubusercontent.com/novels-project/british-fiction-1770-1836/master/data/british-fiction-1800-1829.json",
    "https://raw.githubusercontent.com/novels-project/british-fiction-1770-1836/master/data/british-fiction-1830-1836.json",
    "https://raw.githubusercontent.com/novels-project/british-fiction-1770-1836/master/data/british-fiction-1800-1829-updates.json",
];

const BRITISH_FICTION_ANNEX_URL: &str =
    "https://github.com/novels-project/british-fiction-1770-1915-annex/raw/master/british-fiction-1770-1915-riddell.json";

/// One bibliographic dataset, merged in configured order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub location: DocumentLocation,
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Directories scanned for volume metadata and plaintexts
    pub content_roots: Vec<PathBuf>,
    pub volume_metadata_filename: String,
    /// Extension prefix marking plaintext files
    pub text_extension: String,
    pub digest: DigestAlgorithm,
    /// Canonical id -> external identifiers table
    pub identifiers: DocumentLocation,
    /// Namespaces to build reverse maps for; empty means all of them
    pub namespaces: Vec<String>,
    pub native_namespace: String,
    pub sources: Vec<SourceConfig>,
    pub index_message: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut sources: Vec<SourceConfig> = BRITISH_FICTION_URLS
            .iter()
            .map(|url| SourceConfig {
                location: DocumentLocation::from(*url),
                kind: SourceKind::Keyed {
                    namespace: GARSIDE_NAMESPACE.to_string(),
                },
            })
            .collect();
        sources.push(SourceConfig {
            location: DocumentLocation::from(BRITISH_FICTION_ANNEX_URL),
            kind: SourceKind::Prefixed,
        });

        Config {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            content_roots: vec![PathBuf::from("volumes"), PathBuf::from("nonfree")],
            volume_metadata_filename: "metadata.json".to_string(),
            text_extension: "txt".to_string(),
            digest: DigestAlgorithm::default(),
            identifiers: DocumentLocation::from(IDENTIFIERS_URL),
            namespaces: vec![GARSIDE_NAMESPACE.to_string()],
            native_namespace: NATIVE_NAMESPACE.to_string(),
            sources,
            index_message: "See https://novels.io for details.".to_string(),
        }
    }
}

impl Config {
    /// Configuration from the process environment.
    pub fn load() -> CatalogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> CatalogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("NOVELS_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Config::default(),
        };

        if let Some(bind) = lookup("NOVELS_BIND") {
            config.bind = bind;
        }
        if let Some(port) = lookup("NOVELS_PORT") {
            config.port = port
                .parse()
                .map_err(|_| CatalogError::Config(format!("NOVELS_PORT {port:?} is not a port")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CatalogResult<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&data)
            .map_err(|e| CatalogError::Config(format!("parse {}: {e}", path.display())))
    }

    fn validate(&self) -> CatalogResult<()> {
        if self.text_extension.is_empty() {
            return Err(CatalogError::Config("text_extension must not be empty".into()));
        }
        if self.volume_metadata_filename.is_empty() {
            return Err(CatalogError::Config(
                "volume_metadata_filename must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Namespaces the identity resolver needs reverse maps for.
    ///
    /// Namespaces of keyed sources are always included; an empty list still
    /// means every namespace.
    pub fn resolver_namespaces(&self) -> Vec<String> {
        if self.namespaces.is_empty() {
            return Vec::new();
        }
        let mut namespaces = self.namespaces.clone();
        for source in &self.sources {
            if let SourceKind::Keyed { namespace } = &source.kind {
                if !namespaces.contains(namespace) {
                    namespaces.push(namespace.clone());
                }
            }
        }
        namespaces
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
