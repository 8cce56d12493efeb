//! Record merger: bibliographic datasets -> one record per canonical id.
//!
//! Datasets are merged strictly in the order they are given. Each canonical
//! id accepts exactly one record across all datasets; a second record for
//! the same id is an error rather than an update. Once every dataset is in,
//! [`RecordMerger::finish`] checks that no placeholder was left empty.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::identity::{IdentityResolver, Placeholders};
use crate::model::{Attributes, CanonicalId, SourceId, WorkRecord};

/// How the keys of a dataset identify their works.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Keys are identifiers of a single namespace.
    Keyed { namespace: String },
    /// Keys read `"<namespace>/<local-id>"`.
    Prefixed,
}

pub struct RecordMerger<'a> {
    resolver: &'a IdentityResolver,
    native_namespace: String,
    works: Placeholders,
}

impl<'a> RecordMerger<'a> {
    pub fn new(resolver: &'a IdentityResolver, native_namespace: impl Into<String>) -> Self {
        RecordMerger {
            resolver,
            native_namespace: native_namespace.into(),
            works: resolver.placeholders(),
        }
    }

    /// Merge one dataset document. Returns the number of records merged.
    pub fn merge_source(&mut self, kind: &SourceKind, doc: Value) -> CatalogResult<usize> {
        let label = match kind {
            SourceKind::Keyed { namespace } => namespace.as_str(),
            SourceKind::Prefixed => "prefixed",
        };
        let entries = match doc {
            Value::Object(map) => map,
            _ => {
                return Err(CatalogError::InvalidSource {
                    dataset: label.to_string(),
                    reason: "document is not an object".into(),
                })
            }
        };

        let mut merged = 0;
        for (key, value) in entries {
            let mut attributes = match value {
                Value::Object(map) => map,
                _ => {
                    return Err(CatalogError::InvalidSource {
                        dataset: label.to_string(),
                        reason: format!("record {key} is not an object"),
                    })
                }
            };
            let own_id = attributes.remove("id");

            match kind {
                SourceKind::Keyed { namespace } => {
                    let (id, resolved) = self.resolve(namespace, &key)?;
                    // The record's own id, when present, is what the dataset calls it.
                    let source_id = match own_id {
                        Some(Value::String(s)) => SourceId::External(s),
                        None | Some(Value::Null) => resolved,
                        Some(other) => SourceId::Recorded(other),
                    };
                    self.populate(id, namespace, source_id, attributes)?;
                }
                SourceKind::Prefixed => {
                    let (namespace, local_id) = key
                        .split_once('/')
                        .filter(|(_, local_id)| !local_id.contains('/'))
                        .ok_or_else(|| CatalogError::InvalidSource {
                            dataset: label.to_string(),
                            reason: format!("key {key:?} is not of the form <source>/<id>"),
                        })?;
                    let (id, source_id) = self.resolve(namespace, local_id)?;
                    self.populate(id, namespace, source_id, attributes)?;
                }
            }
            merged += 1;
        }

        log::info!("Merged {} records from {}", merged, label);
        Ok(merged)
    }

    /// Canonical id for `local_id` of `namespace`.
    ///
    /// Native ids are canonical ids already; anything else, including a
    /// native id outside the known id space, goes through the reverse map.
    fn resolve(&self, namespace: &str, local_id: &str) -> CatalogResult<(CanonicalId, SourceId)> {
        if namespace == self.native_namespace {
            if let Ok(id) = local_id.parse::<CanonicalId>() {
                if self.resolver.contains(id) {
                    return Ok((id, SourceId::Native(id)));
                }
            }
        }

        self.resolver
            .resolve(namespace, local_id)
            .map(|id| (id, SourceId::External(local_id.to_string())))
            .ok_or_else(|| CatalogError::UnresolvableIdentifier {
                dataset: namespace.to_string(),
                source_id: local_id.to_string(),
            })
    }

    fn populate(
        &mut self,
        id: CanonicalId,
        source: &str,
        source_id: SourceId,
        attributes: Attributes,
    ) -> CatalogResult<()> {
        let slot = self
            .works
            .get_mut(&id)
            .ok_or_else(|| CatalogError::UnresolvableIdentifier {
                dataset: source.to_string(),
                source_id: source_id.to_string(),
            })?;

        if slot.is_some() {
            return Err(CatalogError::DuplicateRecord {
                id,
                dataset: source.to_string(),
                source_id: source_id.to_string(),
            });
        }

        *slot = Some(WorkRecord {
            id,
            source: source.to_string(),
            source_id,
            attributes,
            volumes: None,
        });
        Ok(())
    }

    /// Consume the merger, requiring a record for every canonical id.
    pub fn finish(self) -> CatalogResult<BTreeMap<CanonicalId, WorkRecord>> {
        self.works
            .into_iter()
            .map(|(id, record)| match record {
                Some(record) => Ok((id, record)),
                None => Err(CatalogError::IncompleteCatalog { id }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver(doc: Value) -> IdentityResolver {
        IdentityResolver::from_document(doc, &[]).unwrap()
    }

    fn keyed(ns: &str) -> SourceKind {
        SourceKind::Keyed {
            namespace: ns.to_string(),
        }
    }

    #[test]
    fn single_keyed_record_populates_its_work() {
        let resolver = resolver(json!({"1": {"ns": "a1"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&keyed("ns"), json!({"a1": {"title": "T"}}))
            .unwrap();

        let works = merger.finish().unwrap();
        let record = &works[&1];
        assert_eq!(
            record.to_value(),
            json!({"id": 1, "title": "T", "source": "ns", "source_id": "a1"})
        );
    }

    #[test]
    fn own_id_becomes_source_id() {
        let resolver = resolver(json!({"4": {"garside": "1810A001"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(
                &keyed("garside"),
                json!({"1810A001": {"id": "1810A001-x", "title": "T"}}),
            )
            .unwrap();

        let record = &merger.finish().unwrap()[&4];
        assert_eq!(record.source_id, SourceId::External("1810A001-x".into()));
        assert!(!record.attributes.contains_key("id"));
    }

    #[test]
    fn numeric_own_id_keeps_its_json_type() {
        let resolver = resolver(json!({"4": {"garside": "k"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&keyed("garside"), json!({"k": {"id": 17}}))
            .unwrap();

        let record = &merger.finish().unwrap()[&4];
        assert_eq!(record.source_id, SourceId::Recorded(json!(17)));
        assert_eq!(record.to_value()["source_id"], json!(17));
    }

    #[test]
    fn keyed_native_namespace_maps_directly() {
        let resolver = resolver(json!({"3": {}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&keyed("novels-project"), json!({"3": {"title": "T"}}))
            .unwrap();

        let record = &merger.finish().unwrap()[&3];
        assert_eq!(record.source, "novels-project");
        assert_eq!(record.source_id, SourceId::Native(3));
    }

    #[test]
    fn prefixed_record_ignores_its_own_id() {
        let resolver = resolver(json!({"8": {"garside": "g8"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(
                &SourceKind::Prefixed,
                json!({"garside/g8": {"id": "something-else", "title": "T"}}),
            )
            .unwrap();

        let record = &merger.finish().unwrap()[&8];
        assert_eq!(record.source_id, SourceId::External("g8".into()));
        assert!(!record.attributes.contains_key("id"));
    }

    #[test]
    fn prefixed_native_ids_map_directly() {
        let resolver = resolver(json!({"3": {}, "8": {"garside": "g8"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(
                &SourceKind::Prefixed,
                json!({
                    "novels-project/3": {"title": "Native"},
                    "garside/g8": {"title": "External"}
                }),
            )
            .unwrap();

        let works = merger.finish().unwrap();
        assert_eq!(works[&3].source, "novels-project");
        assert_eq!(works[&3].source_id, SourceId::Native(3));
        assert_eq!(works[&3].to_value()["source_id"], json!(3));
        assert_eq!(works[&8].source, "garside");
        assert_eq!(works[&8].source_id, SourceId::External("g8".into()));
    }

    #[test]
    fn native_ids_outside_the_id_space_use_the_reverse_map() {
        let resolver = resolver(json!({"3": {"novels-project": "99"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&SourceKind::Prefixed, json!({"novels-project/99": {}}))
            .unwrap();
        assert!(merger.finish().is_ok());
    }

    #[test]
    fn duplicate_across_sources_is_fatal() {
        let resolver = resolver(json!({"1": {"ns": "a1", "other": "b1"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&keyed("ns"), json!({"a1": {"title": "first"}}))
            .unwrap();

        let err = merger
            .merge_source(&keyed("other"), json!({"b1": {"title": "second"}}))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRecord { id: 1, .. }));
    }

    #[test]
    fn unknown_identifier_is_fatal() {
        let resolver = resolver(json!({"1": {"ns": "a1"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");

        let err = merger
            .merge_source(&keyed("ns"), json!({"zz": {"title": "orphan"}}))
            .unwrap_err();
        match err {
            CatalogError::UnresolvableIdentifier { source_id, .. } => assert_eq!(source_id, "zz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unpopulated_id_is_incomplete() {
        let resolver = resolver(json!({"1": {"ns": "a1"}, "2": {"ns": "a2"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        merger
            .merge_source(&keyed("ns"), json!({"a1": {"title": "T"}}))
            .unwrap();

        assert!(matches!(
            merger.finish(),
            Err(CatalogError::IncompleteCatalog { id: 2 })
        ));
    }

    #[test]
    fn malformed_prefixed_key_is_rejected() {
        let resolver = resolver(json!({"1": {}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        let err = merger
            .merge_source(&SourceKind::Prefixed, json!({"no-slash": {}}))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSource { .. }));
    }

    #[test]
    fn prefixed_key_with_extra_slash_is_rejected() {
        let resolver = resolver(json!({"1": {"garside": "a/b"}}));
        let mut merger = RecordMerger::new(&resolver, "novels-project");
        let err = merger
            .merge_source(&SourceKind::Prefixed, json!({"garside/a/b": {}}))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSource { .. }));
    }
}
