//! Volume loader: per-volume metadata documents grouped by work.
//!
//! `work_id` values on disk are already canonical ids; nothing here is
//! resolved against the identity mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Attributes, CanonicalId, VolumeRecord};
use crate::scan::{enumerate_files, has_file_name};
use crate::texts::DigestAlgorithm;

/// Volumes grouped by work id, each group ascending by volume number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeIndex {
    groups: BTreeMap<CanonicalId, Vec<VolumeRecord>>,
}

impl VolumeIndex {
    /// Parse every metadata document named `metadata_filename` under `roots`.
    pub fn load(
        roots: &[PathBuf],
        metadata_filename: &str,
        digest: DigestAlgorithm,
    ) -> CatalogResult<Self> {
        let paths = enumerate_files(roots, |p| has_file_name(p, metadata_filename));

        let mut index = VolumeIndex::default();
        for path in &paths {
            let data = fs::read_to_string(path)?;
            let doc: Value =
                serde_json::from_str(&data).map_err(|e| invalid(path, e.to_string()))?;
            index.insert(parse_volume(path, doc, digest)?);
        }
        index.sort();

        log::info!(
            "Loaded {} volumes for {} works",
            paths.len(),
            index.work_count()
        );
        Ok(index)
    }

    /// Append a volume to its work's group. Call [`VolumeIndex::sort`] once
    /// all volumes are in.
    pub fn insert(&mut self, volume: VolumeRecord) {
        self.groups.entry(volume.work_id).or_default().push(volume);
    }

    /// Order every group ascending by volume number.
    pub fn sort(&mut self) {
        for group in self.groups.values_mut() {
            group.sort_by_key(|v| v.volume);
        }
    }

    pub fn get(&self, work_id: CanonicalId) -> Option<&[VolumeRecord]> {
        self.groups.get(&work_id).map(Vec::as_slice)
    }

    pub fn work_count(&self) -> usize {
        self.groups.len()
    }

    /// Hand the groups over to the catalog assembler.
    pub fn into_groups(self) -> BTreeMap<CanonicalId, Vec<VolumeRecord>> {
        self.groups
    }
}

fn invalid(path: &Path, reason: String) -> CatalogError {
    CatalogError::InvalidVolume {
        path: path.to_path_buf(),
        reason,
    }
}

/// Integers may be stored as JSON numbers or as numeric strings.
fn integer_field(attributes: &Attributes, key: &str) -> Option<u32> {
    match attributes.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_volume(path: &Path, doc: Value, digest: DigestAlgorithm) -> CatalogResult<VolumeRecord> {
    let attributes = match doc {
        Value::Object(map) => map,
        _ => return Err(invalid(path, "document is not an object".into())),
    };

    let work_id = integer_field(&attributes, "work_id")
        .ok_or_else(|| invalid(path, "missing or non-integer work_id".into()))?;
    let volume = integer_field(&attributes, "volume")
        .ok_or_else(|| invalid(path, "missing or non-integer volume".into()))?;
    let text_hash = attributes
        .get(digest.metadata_key())
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(VolumeRecord {
        work_id,
        volume,
        text_hash,
        attributes,
    })
}
