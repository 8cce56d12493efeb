//! Read interface over the finished catalog and text index.
//!
//! A [`Library`] is built once at startup and never mutated, so it can be
//! shared across request handlers behind an `Arc` without locking.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CanonicalId, WorkRecord};
use crate::texts::{DigestAlgorithm, TextIndex};

/// Summary of what is being served
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStatus {
    pub works: usize,
    pub works_with_volumes: usize,
    pub texts: usize,
    /// Digest that keys `/text/{hash}`
    pub digest: DigestAlgorithm,
    pub built_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Library {
    catalog: Catalog,
    texts: TextIndex,
    built_at: DateTime<Utc>,
}

impl Library {
    pub fn new(catalog: Catalog, texts: TextIndex) -> Self {
        Library {
            catalog,
            texts,
            built_at: Utc::now(),
        }
    }

    /// The full catalog, ascending by canonical id.
    pub fn get_all_works(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get_work(&self, id: CanonicalId) -> CatalogResult<&WorkRecord> {
        self.catalog.get(id).ok_or(CatalogError::WorkNotFound(id))
    }

    /// Raw bytes of the plaintext with content hash `hash`.
    pub fn get_text(&self, hash: &str) -> CatalogResult<Vec<u8>> {
        self.texts.read(hash)
    }

    pub fn status(&self) -> LibraryStatus {
        LibraryStatus {
            works: self.catalog.len(),
            works_with_volumes: self.catalog.works_with_volumes(),
            texts: self.texts.len(),
            digest: self.texts.algorithm(),
            built_at: self.built_at,
        }
    }
}
