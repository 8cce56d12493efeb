//! Identity resolver: canonical ids and the external identifiers that name
//! the same works in other cataloging schemes.
//!
//! The mapping document is keyed by canonical id (as a decimal string); each
//! value maps a namespace name to that namespace's identifier for the work:
//!
//! ```json
//! { "17": { "garside-raven-schöwerling": "1810A001", "riddell": "R12" } }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{CanonicalId, WorkRecord};

/// Every known canonical id, each waiting for exactly one record.
pub type Placeholders = BTreeMap<CanonicalId, Option<WorkRecord>>;

#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    ids: BTreeSet<CanonicalId>,
    /// namespace -> external id -> canonical id
    reverse: HashMap<String, HashMap<String, CanonicalId>>,
}

impl IdentityResolver {
    /// Build reverse maps for `namespaces`, or for every namespace found in
    /// the document when `namespaces` is empty.
    ///
    /// Two canonical ids claiming the same external identifier within one
    /// namespace means the mapping is corrupt, and is an error.
    pub fn from_document(doc: Value, namespaces: &[String]) -> CatalogResult<Self> {
        let entries = match doc {
            Value::Object(map) => map,
            _ => {
                return Err(CatalogError::InvalidIdentityMapping(
                    "document is not an object".into(),
                ))
            }
        };

        let wanted = |ns: &str| namespaces.is_empty() || namespaces.iter().any(|n| n == ns);

        let mut resolver = IdentityResolver::default();
        for ns in namespaces {
            resolver.reverse.entry(ns.clone()).or_default();
        }

        for (key, value) in entries {
            let id: CanonicalId = key.trim().parse().map_err(|_| {
                CatalogError::InvalidIdentityMapping(format!("canonical id {key:?} is not an integer"))
            })?;
            let same_as = match value {
                Value::Object(map) => map,
                Value::Null => Default::default(),
                _ => {
                    return Err(CatalogError::InvalidIdentityMapping(format!(
                        "entry for {id} is not an object"
                    )))
                }
            };

            // "1", " 1" and "01" all name the same work.
            if !resolver.ids.insert(id) {
                return Err(CatalogError::InvalidIdentityMapping(format!(
                    "canonical id {id} is listed more than once (as {key:?})"
                )));
            }

            for (namespace, external) in same_as {
                if !wanted(&namespace) {
                    continue;
                }
                let external_id = match external {
                    Value::String(s) if !s.is_empty() => s,
                    Value::Number(n) => n.to_string(),
                    _ => continue,
                };

                let reverse = resolver.reverse.entry(namespace.clone()).or_default();
                if let Some(&first) = reverse.get(&external_id) {
                    if first != id {
                        return Err(CatalogError::ConflictingIdentifier {
                            namespace,
                            external_id,
                            first,
                            second: id,
                        });
                    }
                }
                reverse.insert(external_id, id);
            }
        }

        log::info!(
            "Loaded {} canonical ids across {} namespaces",
            resolver.len(),
            resolver.reverse.len()
        );
        Ok(resolver)
    }

    /// An empty placeholder for every canonical id, ascending.
    pub fn placeholders(&self) -> Placeholders {
        self.ids.iter().map(|&id| (id, None)).collect()
    }

    /// Canonical id for an external identifier in `namespace`.
    pub fn resolve(&self, namespace: &str, external_id: &str) -> Option<CanonicalId> {
        self.reverse.get(namespace)?.get(external_id).copied()
    }

    pub fn contains(&self, id: CanonicalId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_are_ascending_and_empty() {
        let doc = json!({"10": {"ns": "x"}, "2": {"ns": "y"}, "7": {}});
        let resolver = IdentityResolver::from_document(doc, &[]).unwrap();

        let placeholders = resolver.placeholders();
        assert_eq!(placeholders.keys().copied().collect::<Vec<_>>(), vec![2, 7, 10]);
        assert!(placeholders.values().all(Option::is_none));
    }

    #[test]
    fn resolves_only_requested_namespaces() {
        let doc = json!({"1": {"ns": "a1", "other": "o1"}, "2": {"ns": "a2"}});
        let resolver = IdentityResolver::from_document(doc, &["ns".to_string()]).unwrap();

        assert_eq!(resolver.resolve("ns", "a2"), Some(2));
        assert_eq!(resolver.resolve("ns", "missing"), None);
        assert_eq!(resolver.resolve("other", "o1"), None);
    }

    #[test]
    fn conflicting_external_ids_are_fatal() {
        let doc = json!({"1": {"ns": "dup"}, "2": {"ns": "dup"}});
        let err = IdentityResolver::from_document(doc, &[]).unwrap_err();
        match err {
            CatalogError::ConflictingIdentifier {
                namespace,
                external_id,
                first,
                second,
            } => {
                assert_eq!(namespace, "ns");
                assert_eq!(external_id, "dup");
                assert_eq!((first, second), (1, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn conflicts_in_unrequested_namespaces_are_ignored() {
        let doc = json!({"1": {"ns": "a1", "junk": "dup"}, "2": {"ns": "a2", "junk": "dup"}});
        assert!(IdentityResolver::from_document(doc, &["ns".to_string()]).is_ok());
    }

    #[test]
    fn blank_identifiers_are_absent() {
        let doc = json!({"1": {"ns": ""}, "2": {"ns": null}});
        let resolver = IdentityResolver::from_document(doc, &[]).unwrap();
        assert_eq!(resolver.resolve("ns", ""), None);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn repeated_canonical_ids_are_rejected() {
        let doc = json!({"1": {"ns": "a1"}, " 1": {"ns": "b1"}});
        match IdentityResolver::from_document(doc, &[]) {
            Err(CatalogError::InvalidIdentityMapping(msg)) => assert!(msg.contains("canonical id 1")),
            other => panic!("unexpected result: {other:?}"),
        }

        let doc = json!({"01": {}, "1": {}});
        assert!(IdentityResolver::from_document(doc, &[]).is_err());
    }

    #[test]
    fn non_integer_keys_are_rejected() {
        let doc = json!({"abc": {"ns": "a1"}});
        assert!(matches!(
            IdentityResolver::from_document(doc, &[]),
            Err(CatalogError::InvalidIdentityMapping(_))
        ));
    }
}
