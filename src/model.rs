//! Records held by the catalog.
//!
//! Bibliographic sources do not share a schema, so everything beyond the
//! handful of fields the catalog itself reasons about (`id`, `source`,
//! `source_id`, `volumes`, `work_id`, `volume`) is kept as an open
//! [`Attributes`] map of JSON values.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// The single internal identifier of a literary work.
pub type CanonicalId = u32;

/// Open attribute set, ordered by attribute name.
pub type Attributes = serde_json::Map<String, Value>;

/// Identifier a record carried in the dataset it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceId {
    /// Local id of the native namespace, numerically equal to the canonical id.
    Native(CanonicalId),
    /// Identifier of an external cataloging scheme.
    External(String),
    /// Non-string `id` a record carried itself, kept exactly as published.
    Recorded(Value),
}

impl SourceId {
    pub fn to_value(&self) -> Value {
        match self {
            SourceId::Native(id) => Value::from(*id),
            SourceId::External(s) => Value::String(s.clone()),
            SourceId::Recorded(v) => v.clone(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Native(id) => write!(f, "{id}"),
            SourceId::External(s) => f.write_str(s),
            SourceId::Recorded(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for SourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceId::Native(id) => serializer.serialize_u32(*id),
            SourceId::External(s) => serializer.serialize_str(s),
            SourceId::Recorded(v) => v.serialize(serializer),
        }
    }
}

/// A populated bibliographic record for one canonical work.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkRecord {
    pub id: CanonicalId,
    /// Name of the dataset the record came from
    pub source: String,
    pub source_id: SourceId,
    /// Bibliographic attributes as published by the source
    pub attributes: Attributes,
    /// Volumes ordered by volume number; `None` when no volume is known
    pub volumes: Option<Vec<VolumeRecord>>,
}

impl WorkRecord {
    /// Flatten into a single JSON object.
    ///
    /// Reserved fields are written after the source attributes, so a source
    /// cannot shadow `id`, `source`, `source_id` or `volumes`.
    pub fn to_value(&self) -> Value {
        let mut map = self.attributes.clone();
        map.insert("source".to_string(), Value::String(self.source.clone()));
        map.insert("source_id".to_string(), self.source_id.to_value());
        map.insert("id".to_string(), Value::from(self.id));
        if let Some(volumes) = &self.volumes {
            let volumes = volumes
                .iter()
                .map(|v| Value::Object(v.attributes.clone()))
                .collect();
            map.insert("volumes".to_string(), Value::Array(volumes));
        }
        Value::Object(map)
    }
}

impl Serialize for WorkRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Metadata for one printed volume of a work.
///
/// `attributes` holds the metadata document exactly as found on disk; the
/// typed fields are parsed out of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRecord {
    #[serde(skip)]
    pub work_id: CanonicalId,
    #[serde(skip)]
    pub volume: u32,
    /// Content hash of the volume's plaintext, if the metadata names one
    #[serde(skip)]
    pub text_hash: Option<String>,
    #[serde(flatten)]
    pub attributes: Attributes,
}
