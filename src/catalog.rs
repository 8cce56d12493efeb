//! The assembled catalog: merged works with their volumes attached.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{CanonicalId, WorkRecord};
use crate::texts::TextIndex;
use crate::volumes::VolumeIndex;

/// Read-only works listing, ascending by canonical id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    works: BTreeMap<CanonicalId, WorkRecord>,
}

impl Catalog {
    /// Attach each work's volumes under `volumes`.
    ///
    /// Works without volumes are left without the field. Volumes naming an
    /// unknown work, and text hashes missing from `texts`, are reported but
    /// do not stop assembly.
    pub fn assemble(
        mut works: BTreeMap<CanonicalId, WorkRecord>,
        volumes: VolumeIndex,
        texts: &TextIndex,
    ) -> Self {
        for (work_id, group) in volumes.into_groups() {
            for volume in &group {
                if let Some(hash) = &volume.text_hash {
                    if !texts.contains(hash) {
                        log::warn!(
                            "Volume {} of work {} references missing text {}",
                            volume.volume,
                            work_id,
                            hash
                        );
                    }
                }
            }

            match works.get_mut(&work_id) {
                Some(work) => work.volumes = Some(group),
                None => log::warn!(
                    "Ignoring {} volumes for unknown work {}",
                    group.len(),
                    work_id
                ),
            }
        }

        log::info!("Assembled catalog of {} works", works.len());
        Catalog { works }
    }

    pub fn get(&self, id: CanonicalId) -> Option<&WorkRecord> {
        self.works.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalId, &WorkRecord)> {
        self.works.iter()
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }

    /// Number of works with at least one volume attached.
    pub fn works_with_volumes(&self) -> usize {
        self.works.values().filter(|w| w.volumes.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, SourceId, VolumeRecord};
    use serde_json::json;

    fn work(id: CanonicalId) -> WorkRecord {
        WorkRecord {
            id,
            source: "ns".into(),
            source_id: SourceId::External(format!("a{id}")),
            attributes: Attributes::new(),
            volumes: None,
        }
    }

    fn volume(work_id: CanonicalId, volume: u32) -> VolumeRecord {
        let mut attributes = Attributes::new();
        attributes.insert("work_id".into(), json!(work_id));
        attributes.insert("volume".into(), json!(volume));
        VolumeRecord {
            work_id,
            volume,
            text_hash: None,
            attributes,
        }
    }

    #[test]
    fn volumes_attach_in_order_and_absence_is_preserved() {
        let works: BTreeMap<_, _> = [(1, work(1)), (2, work(2))].into_iter().collect();
        let mut volumes = VolumeIndex::default();
        for v in [3, 1, 2] {
            volumes.insert(volume(1, v));
        }
        volumes.insert(volume(99, 1));
        volumes.sort();

        let catalog = Catalog::assemble(works, volumes, &TextIndex::default());

        let record = catalog.get(1).unwrap();
        let attached: Vec<u32> = record.volumes.iter().flatten().map(|v| v.volume).collect();
        assert_eq!(attached, vec![1, 2, 3]);
        assert!(catalog.get(2).unwrap().volumes.is_none());
        assert!(catalog.get(99).is_none());
        assert_eq!(catalog.works_with_volumes(), 1);
    }

    #[test]
    fn serializes_as_object_keyed_by_id() {
        let works: BTreeMap<_, _> = [(2, work(2)), (10, work(10))].into_iter().collect();
        let catalog = Catalog::assemble(works, VolumeIndex::default(), &TextIndex::default());

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["10"]["id"], json!(10));
        assert_eq!(value["2"]["source_id"], json!("a2"));
        assert_eq!(catalog.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![2, 10]);
    }
}
