//! Error taxonomy for catalog construction and lookup.
//!
//! Every variant except [`CatalogError::WorkNotFound`] and
//! [`CatalogError::TextNotFound`] is raised while the catalog is being built
//! and aborts startup. The two not-found variants are raised by the query
//! interface and are always recoverable.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::CanonicalId;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not find mapping for {source_id} (dataset {dataset})")]
    UnresolvableIdentifier { dataset: String, source_id: String },

    #[error("Found duplicate entry: {id} (from {dataset} record {source_id})")]
    DuplicateRecord {
        id: CanonicalId,
        dataset: String,
        source_id: String,
    },

    #[error("Found no information for id {id}")]
    IncompleteCatalog { id: CanonicalId },

    #[error(
        "Identifier {external_id} in namespace {namespace} maps to both {first} and {second}"
    )]
    ConflictingIdentifier {
        namespace: String,
        external_id: String,
        first: CanonicalId,
        second: CanonicalId,
    },

    #[error("Invalid identity mapping: {0}")]
    InvalidIdentityMapping(String),

    #[error("Invalid record source {dataset}: {reason}")]
    InvalidSource { dataset: String, reason: String },

    #[error("Invalid volume metadata {}: {reason}", .path.display())]
    InvalidVolume { path: PathBuf, reason: String },

    #[error("Failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Work not found: {0}")]
    WorkNotFound(CanonicalId),

    #[error("Text not found for hash: {0}")]
    TextNotFound(String),
}

impl CatalogError {
    /// True for the lookup misses the query interface reports to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::WorkNotFound(_) | CatalogError::TextNotFound(_)
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
