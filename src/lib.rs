//! Novels catalog: reconciled bibliographic records for literary works and
//! their printed volumes.
//!
//! Architecture:
//! ```text
//! identifiers.json ──► IdentityResolver ──┐
//!                                          ▼
//! datasets (in order) ───────────────► RecordMerger ──► works
//!                                                          │
//! content roots ──► VolumeIndex ──────────────────► Catalog::assemble
//!               └─► TextIndex ───────────────────────────┐ │
//!                                                        ▼ ▼
//!                                                      Library ──► server
//! ```
//!
//! Everything is built once by [`build_catalog`] before any request is
//! served. Any failure aborts the build; there is no partial catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod merge;
pub mod model;
pub mod scan;
pub mod server;
pub mod service;
pub mod texts;
pub mod volumes;

pub use catalog::Catalog;
pub use config::{Config, SourceConfig};
pub use error::{CatalogError, CatalogResult};
pub use fetch::DocumentLocation;
pub use merge::SourceKind;
pub use model::{Attributes, CanonicalId, SourceId, VolumeRecord, WorkRecord};
pub use service::Library;
pub use texts::DigestAlgorithm;

use fetch::Fetcher;
use identity::IdentityResolver;
use merge::RecordMerger;
use texts::TextIndex;
use volumes::VolumeIndex;

/// Build the catalog and text index described by `config`.
///
/// Content roots are scanned first, then the identity mapping and every
/// dataset are fetched and merged in configured order.
pub async fn build_catalog(config: &Config) -> CatalogResult<Library> {
    let texts = TextIndex::build(&config.content_roots, &config.text_extension, config.digest)?;
    if texts.is_empty() {
        log::warn!("No texts found under {:?}", config.content_roots);
    }
    let volumes = VolumeIndex::load(
        &config.content_roots,
        &config.volume_metadata_filename,
        config.digest,
    )?;

    let fetcher = Fetcher::new();
    let mapping = fetcher.fetch(&config.identifiers).await?;
    let resolver = IdentityResolver::from_document(mapping, &config.resolver_namespaces())?;
    if resolver.is_empty() {
        log::warn!("Identity mapping {} lists no works", config.identifiers);
    }

    let mut merger = RecordMerger::new(&resolver, config.native_namespace.clone());
    for source in &config.sources {
        let doc = fetcher.fetch(&source.location).await?;
        merger.merge_source(&source.kind, doc)?;
    }
    let works = merger.finish()?;

    let catalog = Catalog::assemble(works, volumes, &texts);
    Ok(Library::new(catalog, texts))
}
