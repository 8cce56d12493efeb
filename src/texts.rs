//! Text index: content hash -> plaintext file location.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{CatalogError, CatalogResult};
use crate::scan::{enumerate_files, has_extension_prefix};

/// Digest used to key plaintext files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Hex-encoded digest of `bytes`.
    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }

    /// Key under which volume metadata records the hash of its text.
    pub fn metadata_key(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

/// Mapping of content hash -> path of a plaintext file with that content.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    algorithm: DigestAlgorithm,
    entries: HashMap<String, PathBuf>,
}

impl TextIndex {
    /// Hash every plaintext file under `roots`.
    ///
    /// Byte-identical copies hash to the same key; the copy found last wins,
    /// which is harmless because the content is the same.
    pub fn build(
        roots: &[PathBuf],
        text_extension: &str,
        algorithm: DigestAlgorithm,
    ) -> CatalogResult<Self> {
        let paths = enumerate_files(roots, |p| has_extension_prefix(p, text_extension));

        let mut entries = HashMap::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)?;
            let hash = algorithm.hex_digest(&bytes);
            if let Some(previous) = entries.insert(hash.clone(), path) {
                log::debug!(
                    "Identical text {} also found at {}",
                    hash,
                    previous.display()
                );
            }
        }

        log::info!("Indexed {} texts", entries.len());
        Ok(TextIndex { algorithm, entries })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    /// Location of the file with the given content hash.
    pub fn path(&self, hash: &str) -> Option<&Path> {
        self.entries.get(hash).map(PathBuf::as_path)
    }

    /// Raw bytes of the file with the given content hash.
    pub fn read(&self, hash: &str) -> CatalogResult<Vec<u8>> {
        let path = self
            .path(hash)
            .ok_or_else(|| CatalogError::TextNotFound(hash.to_string()))?;
        Ok(fs::read(path)?)
    }
}
